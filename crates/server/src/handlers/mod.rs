//! HTTP request handlers.

pub mod fragments;
pub mod service;

pub use fragments::*;
pub use service::*;

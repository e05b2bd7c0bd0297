//! HTTP API server for the fragments content store.
//!
//! This crate provides the HTTP surface over [`fragments_model`]:
//! - HTTP Basic authentication mapped to hashed owner ids
//! - Fragment create, list, read, convert, update and delete
//! - `{"status": ...}` response envelopes
//! - Prometheus metrics

pub mod auth;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod response;
pub mod routes;
pub mod state;

pub use auth::AuthenticatedOwner;
pub use error::ApiError;
pub use routes::create_router;
pub use state::AppState;

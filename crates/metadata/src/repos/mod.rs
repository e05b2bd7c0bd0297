//! Repository traits for metadata store operations.

pub mod fragments;

pub use fragments::FragmentRepo;

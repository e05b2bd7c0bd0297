//! Error types for the core domain.

use thiserror::Error;

/// Core domain error type.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid media type: {0}")]
    InvalidMediaType(String),

    #[error("unsupported type: {0}")]
    UnsupportedType(String),

    #[error("unsupported conversion: {from} -> {to}")]
    UnsupportedConversion { from: String, to: String },

    #[error("invalid owner id: {0}")]
    InvalidOwnerId(String),

    #[error("invalid fragment id: {0}")]
    InvalidFragmentId(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, Error>;

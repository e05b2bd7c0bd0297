//! Data store error types.

use thiserror::Error;

/// Errors returned by [`DataStore`](crate::DataStore) backends.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("fragment data not found: {0}")]
    NotFound(String),

    #[error("data store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("S3 error: {0}")]
    S3(#[from] Box<dyn std::error::Error + Send + Sync>),

    #[error("data store configuration error: {0}")]
    Config(String),
}

/// Result type for data store operations.
pub type StorageResult<T> = std::result::Result<T, StorageError>;

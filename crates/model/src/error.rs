//! Error type for fragment operations.

use fragments_metadata::MetadataError;
use fragments_storage::StorageError;
use thiserror::Error;

/// Errors surfaced by [`Fragment`](crate::Fragment) operations and conversion.
///
/// Backend "not found" conditions are lifted into [`FragmentError::NotFound`];
/// every other backend failure is carried unchanged.
#[derive(Debug, Error)]
pub enum FragmentError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("unsupported type: {0}")]
    UnsupportedType(String),

    #[error("unsupported conversion: {from} -> {to}")]
    UnsupportedConversion { from: String, to: String },

    #[error("fragment not found: {0}")]
    NotFound(String),

    #[error("conversion failed: {0}")]
    Conversion(String),

    #[error("storage error: {0}")]
    Storage(#[source] StorageError),

    #[error("metadata error: {0}")]
    Metadata(#[source] MetadataError),
}

impl FragmentError {
    /// Short machine-readable kind, used as a metrics label.
    pub fn kind(&self) -> &'static str {
        match self {
            FragmentError::Validation(_) => "validation",
            FragmentError::UnsupportedType(_) => "unsupported_type",
            FragmentError::UnsupportedConversion { .. } => "unsupported_conversion",
            FragmentError::NotFound(_) => "not_found",
            FragmentError::Conversion(_) => "conversion",
            FragmentError::Storage(_) => "storage",
            FragmentError::Metadata(_) => "metadata",
        }
    }
}

impl From<StorageError> for FragmentError {
    fn from(e: StorageError) -> Self {
        match e {
            StorageError::NotFound(key) => FragmentError::NotFound(key),
            other => FragmentError::Storage(other),
        }
    }
}

impl From<MetadataError> for FragmentError {
    fn from(e: MetadataError) -> Self {
        match e {
            MetadataError::NotFound(key) => FragmentError::NotFound(key),
            other => FragmentError::Metadata(other),
        }
    }
}

impl From<fragments_core::Error> for FragmentError {
    fn from(e: fragments_core::Error) -> Self {
        use fragments_core::Error as CoreError;
        match e {
            CoreError::InvalidMediaType(value) | CoreError::UnsupportedType(value) => {
                FragmentError::UnsupportedType(value)
            }
            CoreError::UnsupportedConversion { from, to } => {
                FragmentError::UnsupportedConversion { from, to }
            }
            other => FragmentError::Validation(other.to_string()),
        }
    }
}

/// Result type for fragment operations.
pub type FragmentResult<T> = std::result::Result<T, FragmentError>;

//! Fragment data storage for the fragments service.
//!
//! This crate provides:
//! - The owner-partitioned [`DataStore`] abstraction
//! - Backends: process memory, local filesystem and S3-compatible

pub mod backends;
pub mod error;
pub mod traits;

pub use backends::{filesystem::FilesystemBackend, memory::MemoryBackend, s3::S3Backend};
pub use error::{StorageError, StorageResult};
pub use traits::{DataStore, data_key};

use fragments_core::config::StorageConfig;
use std::sync::Arc;

/// Create a data store from configuration.
pub async fn from_config(config: &StorageConfig) -> StorageResult<Arc<dyn DataStore>> {
    config.validate().map_err(StorageError::Config)?;

    match config {
        StorageConfig::Memory => Ok(Arc::new(MemoryBackend::new())),
        StorageConfig::Filesystem { path } => {
            let backend = FilesystemBackend::new(path).await?;
            Ok(Arc::new(backend))
        }
        StorageConfig::S3 {
            bucket,
            endpoint,
            region,
            prefix,
            access_key_id,
            secret_access_key,
            force_path_style,
        } => {
            let backend = S3Backend::new(
                bucket,
                endpoint.clone(),
                region.clone(),
                prefix.clone(),
                access_key_id.clone(),
                secret_access_key.clone(),
                *force_path_style,
            )
            .await?;
            Ok(Arc::new(backend))
        }
    }
}

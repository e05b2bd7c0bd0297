//! Fragment metadata stores.
//!
//! This crate provides:
//! - The owner-partitioned [`FragmentRepo`] operations
//! - The [`MetadataStore`] trait combining them with lifecycle hooks
//! - Implementations: process memory and SQLite

pub mod error;
pub mod memory;
pub mod models;
pub mod repos;
pub mod store;

pub use error::{MetadataError, MetadataResult};
pub use memory::MemoryMetadataStore;
pub use repos::FragmentRepo;
pub use store::{MetadataStore, SqliteStore};

use fragments_core::config::MetadataConfig;
use std::sync::Arc;

/// Create a metadata store from configuration.
pub async fn from_config(config: &MetadataConfig) -> MetadataResult<Arc<dyn MetadataStore>> {
    config.validate().map_err(MetadataError::Config)?;

    match config {
        MetadataConfig::Memory => Ok(Arc::new(MemoryMetadataStore::new()) as Arc<dyn MetadataStore>),
        MetadataConfig::Sqlite { path } => {
            let store = SqliteStore::new(path).await?;
            Ok(Arc::new(store) as Arc<dyn MetadataStore>)
        }
    }
}

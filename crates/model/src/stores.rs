//! The pair of stores every fragment operation works against.

use fragments_metadata::{MemoryMetadataStore, MetadataStore};
use fragments_storage::{DataStore, MemoryBackend};
use std::sync::Arc;

/// Metadata store and data store, passed explicitly to fragment operations.
///
/// Cloning is cheap: both stores are reference counted.
#[derive(Clone)]
pub struct Stores {
    pub metadata: Arc<dyn MetadataStore>,
    pub data: Arc<dyn DataStore>,
}

impl Stores {
    pub fn new(metadata: Arc<dyn MetadataStore>, data: Arc<dyn DataStore>) -> Self {
        Self { metadata, data }
    }

    /// Fresh, empty process-local stores.
    pub fn in_memory() -> Self {
        Self {
            metadata: Arc::new(MemoryMetadataStore::new()),
            data: Arc::new(MemoryBackend::new()),
        }
    }
}

impl std::fmt::Debug for Stores {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Stores")
            .field("metadata", &self.metadata.backend_name())
            .field("data", &self.data.backend_name())
            .finish()
    }
}

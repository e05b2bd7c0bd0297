use async_trait::async_trait;
use bytes::Bytes;
use fragments_core::{FragmentId, OwnerId};
use fragments_metadata::SqliteStore;
use fragments_model::Stores;
use fragments_storage::{DataStore, FilesystemBackend, StorageError, StorageResult};
use std::sync::Arc;
use tempfile::TempDir;

/// SQLite metadata plus filesystem data, rooted in a temp directory.
#[allow(dead_code)]
pub async fn persistent_stores() -> (Stores, TempDir) {
    let dir = TempDir::new().unwrap();
    let metadata = SqliteStore::new(dir.path().join("metadata.db")).await.unwrap();
    let data = FilesystemBackend::new(dir.path().join("data")).await.unwrap();
    (Stores::new(Arc::new(metadata), Arc::new(data)), dir)
}

/// Data store whose every operation fails with an I/O error.
#[allow(dead_code)]
pub struct FailingDataStore;

fn unavailable() -> StorageError {
    StorageError::Io(std::io::Error::other("backend unavailable"))
}

#[async_trait]
impl DataStore for FailingDataStore {
    async fn put_data(&self, _: &OwnerId, _: &FragmentId, _: Bytes) -> StorageResult<()> {
        Err(unavailable())
    }

    async fn get_data(&self, _: &OwnerId, _: &FragmentId) -> StorageResult<Option<Bytes>> {
        Err(unavailable())
    }

    async fn delete_data(&self, _: &OwnerId, _: &FragmentId) -> StorageResult<()> {
        Err(unavailable())
    }

    fn backend_name(&self) -> &'static str {
        "failing"
    }
}

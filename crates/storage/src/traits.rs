//! Storage trait definitions.

use crate::error::StorageResult;
use async_trait::async_trait;
use bytes::Bytes;
use fragments_core::{FragmentId, OwnerId};

/// Object key for a fragment's data: `{owner}/{id}`.
///
/// Backends that need a key string (filesystem, S3) derive it here so every
/// backend partitions data by owner the same way.
pub fn data_key(owner_id: &OwnerId, id: &FragmentId) -> String {
    format!("{owner_id}/{id}")
}

/// Owner-partitioned store for fragment data bytes.
///
/// Every operation is keyed by `(owner_id, id)`; data stored under one owner
/// is never visible through another owner's key.
#[async_trait]
pub trait DataStore: Send + Sync + 'static {
    /// Store bytes, replacing any previous value.
    async fn put_data(&self, owner_id: &OwnerId, id: &FragmentId, data: Bytes)
    -> StorageResult<()>;

    /// Fetch bytes. Returns `None` when nothing is stored under the key.
    async fn get_data(&self, owner_id: &OwnerId, id: &FragmentId) -> StorageResult<Option<Bytes>>;

    /// Remove bytes. Returns [`StorageError::NotFound`](crate::StorageError::NotFound)
    /// when nothing is stored under the key.
    async fn delete_data(&self, owner_id: &OwnerId, id: &FragmentId) -> StorageResult<()>;

    /// Get the name of this storage backend ("memory", "filesystem", "s3").
    ///
    /// Used for metrics and logging.
    fn backend_name(&self) -> &'static str;

    /// Verify the backend is reachable and writable.
    async fn health_check(&self) -> StorageResult<()> {
        Ok(())
    }
}

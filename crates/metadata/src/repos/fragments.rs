//! Fragment metadata repository trait.

use crate::error::MetadataResult;
use async_trait::async_trait;
use fragments_core::{FragmentId, FragmentRecord, OwnerId};

/// Repository for fragment metadata, partitioned by owner.
#[async_trait]
pub trait FragmentRepo: Send + Sync {
    /// Insert or replace the record stored under `(record.owner_id, record.id)`.
    async fn put_metadata(&self, record: &FragmentRecord) -> MetadataResult<()>;

    /// Get one record. `None` when the owner has no fragment with this id.
    async fn get_metadata(
        &self,
        owner_id: &OwnerId,
        id: &FragmentId,
    ) -> MetadataResult<Option<FragmentRecord>>;

    /// All records of one owner, oldest first. Empty when the owner has none.
    async fn query_metadata(&self, owner_id: &OwnerId) -> MetadataResult<Vec<FragmentRecord>>;

    /// Remove one record. Returns [`MetadataError::NotFound`](crate::MetadataError::NotFound)
    /// when there is nothing to remove.
    async fn delete_metadata(&self, owner_id: &OwnerId, id: &FragmentId) -> MetadataResult<()>;
}

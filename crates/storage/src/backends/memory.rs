//! Process-local storage backend.

use crate::error::StorageResult;
use crate::traits::DataStore;
use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;
use fragments_core::{FragmentId, OwnerId};
use std::collections::HashMap;
use tracing::instrument;

/// In-memory data store, partitioned per owner.
///
/// Each owner's fragments live in their own map, so a lookup can only ever
/// see the requesting owner's data.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    owners: DashMap<OwnerId, HashMap<FragmentId, Bytes>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored objects across all owners.
    pub fn len(&self) -> usize {
        self.owners.iter().map(|entry| entry.value().len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl DataStore for MemoryBackend {
    #[instrument(skip(self, data), fields(backend = "memory", size = data.len()))]
    async fn put_data(
        &self,
        owner_id: &OwnerId,
        id: &FragmentId,
        data: Bytes,
    ) -> StorageResult<()> {
        self.owners
            .entry(owner_id.clone())
            .or_default()
            .insert(id.clone(), data);
        Ok(())
    }

    #[instrument(skip(self), fields(backend = "memory"))]
    async fn get_data(&self, owner_id: &OwnerId, id: &FragmentId) -> StorageResult<Option<Bytes>> {
        Ok(self
            .owners
            .get(owner_id)
            .and_then(|fragments| fragments.get(id).cloned()))
    }

    #[instrument(skip(self), fields(backend = "memory"))]
    async fn delete_data(&self, owner_id: &OwnerId, id: &FragmentId) -> StorageResult<()> {
        let removed = self
            .owners
            .get_mut(owner_id)
            .and_then(|mut fragments| fragments.remove(id));
        match removed {
            Some(_) => Ok(()),
            None => Err(crate::StorageError::NotFound(crate::data_key(owner_id, id))),
        }
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

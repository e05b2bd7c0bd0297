//! Process-local metadata store.

use crate::error::{MetadataError, MetadataResult};
use crate::repos::FragmentRepo;
use crate::store::MetadataStore;
use async_trait::async_trait;
use dashmap::DashMap;
use fragments_core::{FragmentId, FragmentRecord, OwnerId};
use std::collections::HashMap;
use tracing::instrument;

/// In-memory metadata store, partitioned per owner.
///
/// Records are kept in their serialized JSON form, so reads hand out fresh
/// values and callers never share state with the store.
#[derive(Debug, Default)]
pub struct MemoryMetadataStore {
    owners: DashMap<OwnerId, HashMap<FragmentId, String>>,
}

impl MemoryMetadataStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MetadataStore for MemoryMetadataStore {
    async fn migrate(&self) -> MetadataResult<()> {
        Ok(())
    }

    async fn health_check(&self) -> MetadataResult<()> {
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

#[async_trait]
impl FragmentRepo for MemoryMetadataStore {
    #[instrument(skip(self, record), fields(backend = "memory", owner_id = %record.owner_id, id = %record.id))]
    async fn put_metadata(&self, record: &FragmentRecord) -> MetadataResult<()> {
        let json = record.to_json()?;
        self.owners
            .entry(record.owner_id.clone())
            .or_default()
            .insert(record.id.clone(), json);
        Ok(())
    }

    #[instrument(skip(self), fields(backend = "memory"))]
    async fn get_metadata(
        &self,
        owner_id: &OwnerId,
        id: &FragmentId,
    ) -> MetadataResult<Option<FragmentRecord>> {
        let json = self
            .owners
            .get(owner_id)
            .and_then(|records| records.get(id).cloned());
        match json {
            Some(json) => Ok(Some(FragmentRecord::from_json(&json)?)),
            None => Ok(None),
        }
    }

    #[instrument(skip(self), fields(backend = "memory"))]
    async fn query_metadata(&self, owner_id: &OwnerId) -> MetadataResult<Vec<FragmentRecord>> {
        let serialized: Vec<String> = match self.owners.get(owner_id) {
            Some(records) => records.values().cloned().collect(),
            None => return Ok(Vec::new()),
        };

        let mut records = serialized
            .iter()
            .map(|json| FragmentRecord::from_json(json))
            .collect::<Result<Vec<_>, _>>()?;
        records.sort_by(|a, b| a.created.cmp(&b.created).then_with(|| a.id.cmp(&b.id)));
        Ok(records)
    }

    #[instrument(skip(self), fields(backend = "memory"))]
    async fn delete_metadata(&self, owner_id: &OwnerId, id: &FragmentId) -> MetadataResult<()> {
        let removed = self
            .owners
            .get_mut(owner_id)
            .and_then(|mut records| records.remove(id));
        match removed {
            Some(_) => Ok(()),
            None => Err(MetadataError::NotFound(format!("{owner_id}/{id}"))),
        }
    }
}

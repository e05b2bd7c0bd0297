//! Database row types.

use fragments_core::FragmentRecord;
use sqlx::FromRow;

use crate::error::MetadataResult;

/// A row of the `fragments` table. The record itself is stored as JSON text.
#[derive(Debug, Clone, FromRow)]
pub struct FragmentRow {
    pub owner_id: String,
    pub fragment_id: String,
    pub record: String,
}

impl FragmentRow {
    pub fn from_record(record: &FragmentRecord) -> MetadataResult<Self> {
        Ok(Self {
            owner_id: record.owner_id.to_string(),
            fragment_id: record.id.to_string(),
            record: record.to_json()?,
        })
    }

    pub fn into_record(self) -> MetadataResult<FragmentRecord> {
        Ok(FragmentRecord::from_json(&self.record)?)
    }
}

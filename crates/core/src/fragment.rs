//! Fragment identifiers and the persisted metadata record.

use crate::error::{Error, Result};
use crate::owner::{OwnerId, validate_key_segment};
use serde::{Deserialize, Serialize};
use std::fmt;
use time::OffsetDateTime;
use uuid::Uuid;

/// Identifier of a fragment, unique within its owner.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FragmentId(String);

impl FragmentId {
    /// Generate a new random identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Parse a caller-supplied identifier.
    pub fn parse(value: impl Into<String>) -> Result<Self> {
        let value = value.into();
        validate_key_segment(&value).map_err(Error::InvalidFragmentId)?;
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for FragmentId {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(value)
    }
}

impl From<FragmentId> for String {
    fn from(id: FragmentId) -> Self {
        id.0
    }
}

impl AsRef<str> for FragmentId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for FragmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FragmentId({})", self.0)
    }
}

impl fmt::Display for FragmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Fragment metadata as persisted by a metadata store.
///
/// Serialized as camelCase JSON with RFC 3339 timestamps:
/// `{"id", "ownerId", "type", "size", "created", "updated"}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FragmentRecord {
    pub id: FragmentId,
    pub owner_id: OwnerId,
    /// Full media type as supplied, parameters included.
    #[serde(rename = "type")]
    pub media_type: String,
    /// Size in bytes of the most recently stored data.
    pub size: u64,
    #[serde(with = "time::serde::rfc3339")]
    pub created: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated: OffsetDateTime,
}

impl FragmentRecord {
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| Error::Serialization(e.to_string()))
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::Serialization(e.to_string()))
    }
}

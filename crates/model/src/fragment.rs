//! The fragment entity and its persistence operations.

use crate::convert;
use crate::error::{FragmentError, FragmentResult};
use crate::stores::Stores;
use bytes::Bytes;
use fragments_core::media_type::TypePolicy;
use fragments_core::{FragmentId, FragmentRecord, OwnerId, base_type, conversion_targets};
use fragments_metadata::{FragmentRepo, MetadataError};
use fragments_storage::{DataStore, StorageError};
use serde::Serialize;
use time::OffsetDateTime;
use tracing::instrument;

/// Attributes for constructing a [`Fragment`].
///
/// These usually come from an untrusted caller, so every field is checked by
/// [`Fragment::new`].
#[derive(Clone, Debug, Default)]
pub struct NewFragment {
    /// Identifier to use; a random one is generated when absent.
    pub id: Option<String>,
    pub owner_id: String,
    /// Media type, parameters allowed (`text/plain; charset=utf-8`).
    pub media_type: String,
    /// Initial size in bytes; defaults to 0.
    pub size: Option<i64>,
    pub created: Option<OffsetDateTime>,
    pub updated: Option<OffsetDateTime>,
}

impl NewFragment {
    pub fn new(owner_id: impl Into<String>, media_type: impl Into<String>) -> Self {
        Self {
            owner_id: owner_id.into(),
            media_type: media_type.into(),
            ..Self::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_size(mut self, size: i64) -> Self {
        self.size = Some(size);
        self
    }
}

/// A fragment's ids, or the fragments themselves, as returned by [`Fragment::by_user`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FragmentList {
    Ids(Vec<FragmentId>),
    Expanded(Vec<Fragment>),
}

impl FragmentList {
    pub fn len(&self) -> usize {
        match self {
            FragmentList::Ids(ids) => ids.len(),
            FragmentList::Expanded(fragments) => fragments.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A piece of owned content: metadata in the metadata store, bytes in the data store.
///
/// Writes are last-writer-wins; two concurrent `set_data` calls on the same
/// fragment leave the stores holding one complete write or the other.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Fragment {
    id: FragmentId,
    owner_id: OwnerId,
    #[serde(with = "time::serde::rfc3339")]
    created: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    updated: OffsetDateTime,
    #[serde(rename = "type")]
    media_type: String,
    size: u64,
    #[serde(skip)]
    base: String,
}

impl Fragment {
    /// Construct a fragment accepted by the default type policy.
    pub fn new(attrs: NewFragment) -> FragmentResult<Self> {
        Self::with_policy(attrs, &TypePolicy::default())
    }

    /// Construct a fragment, checking its type against `policy`.
    ///
    /// Nothing is persisted; call [`Fragment::save`] or [`Fragment::set_data`].
    pub fn with_policy(attrs: NewFragment, policy: &TypePolicy) -> FragmentResult<Self> {
        if attrs.owner_id.is_empty() {
            return Err(FragmentError::Validation("ownerId is required".to_string()));
        }
        if attrs.media_type.trim().is_empty() {
            return Err(FragmentError::Validation("type is required".to_string()));
        }
        if !policy.is_supported(&attrs.media_type) {
            return Err(FragmentError::UnsupportedType(attrs.media_type));
        }
        let size = match attrs.size {
            None => 0,
            Some(size) => u64::try_from(size).map_err(|_| {
                FragmentError::Validation(format!("size must be a non-negative number, got {size}"))
            })?,
        };

        let owner_id = OwnerId::parse(attrs.owner_id)?;
        let id = match attrs.id {
            Some(id) => FragmentId::parse(id)?,
            None => FragmentId::generate(),
        };
        let base = base_type(&attrs.media_type)?;

        let now = OffsetDateTime::now_utc();
        Ok(Self {
            id,
            owner_id,
            created: attrs.created.unwrap_or(now),
            updated: attrs.updated.unwrap_or(now),
            media_type: attrs.media_type,
            size,
            base,
        })
    }

    /// Rebuild a fragment from a stored record.
    ///
    /// The type policy is not consulted so fragments stored under a more
    /// permissive configuration stay readable.
    pub fn from_record(record: FragmentRecord) -> FragmentResult<Self> {
        let base = base_type(&record.media_type)?;
        Ok(Self {
            id: record.id,
            owner_id: record.owner_id,
            created: record.created,
            updated: record.updated,
            media_type: record.media_type,
            size: record.size,
            base,
        })
    }

    pub fn to_record(&self) -> FragmentRecord {
        FragmentRecord {
            id: self.id.clone(),
            owner_id: self.owner_id.clone(),
            media_type: self.media_type.clone(),
            size: self.size,
            created: self.created,
            updated: self.updated,
        }
    }

    pub fn id(&self) -> &FragmentId {
        &self.id
    }

    pub fn owner_id(&self) -> &OwnerId {
        &self.owner_id
    }

    /// Full media type, parameters included.
    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn created(&self) -> OffsetDateTime {
        self.created
    }

    pub fn updated(&self) -> OffsetDateTime {
        self.updated
    }

    /// Media type without parameters (`text/plain`).
    pub fn mime_type(&self) -> &str {
        &self.base
    }

    pub fn is_text(&self) -> bool {
        self.base.starts_with("text/")
    }

    /// Media types this fragment can be rendered as, its own type first.
    pub fn formats(&self) -> Vec<&'static str> {
        conversion_targets(&self.base).to_vec()
    }

    /// Persist metadata, refreshing `updated`.
    #[instrument(skip(self, stores), fields(owner_id = %self.owner_id, id = %self.id))]
    pub async fn save(&mut self, stores: &Stores) -> FragmentResult<()> {
        self.touch();
        stores.metadata.put_metadata(&self.to_record()).await?;
        Ok(())
    }

    /// Replace the fragment's data, updating size and `updated`.
    ///
    /// Metadata is written before data.
    #[instrument(skip(self, stores, data), fields(owner_id = %self.owner_id, id = %self.id, size = data.len()))]
    pub async fn set_data(&mut self, stores: &Stores, data: Bytes) -> FragmentResult<()> {
        self.size = data.len() as u64;
        self.save(stores).await?;
        stores
            .data
            .put_data(&self.owner_id, &self.id, data)
            .await?;
        Ok(())
    }

    /// Fetch the fragment's data.
    pub async fn get_data(&self, stores: &Stores) -> FragmentResult<Bytes> {
        stores
            .data
            .get_data(&self.owner_id, &self.id)
            .await?
            .ok_or_else(|| FragmentError::NotFound(format!("{}/{}", self.owner_id, self.id)))
    }

    /// Fetch the fragment's data rendered as `target` (extension or media type).
    ///
    /// Returns the resolved media type with the bytes. Legality is checked
    /// before the data is read.
    pub async fn converted_data(
        &self,
        stores: &Stores,
        target: &str,
    ) -> FragmentResult<(&'static str, Bytes)> {
        let target_type = convert::check_conversion(&self.base, target)?;
        let data = self.get_data(stores).await?;
        let converted = convert::convert(data, &self.media_type, target_type)?;
        Ok((target_type, converted))
    }

    /// Look up one fragment of `owner_id`. `None` when it does not exist.
    pub async fn by_id(
        stores: &Stores,
        owner_id: &OwnerId,
        id: &FragmentId,
    ) -> FragmentResult<Option<Fragment>> {
        match stores.metadata.get_metadata(owner_id, id).await? {
            Some(record) => Ok(Some(Fragment::from_record(record)?)),
            None => Ok(None),
        }
    }

    /// All fragments of `owner_id`: ids only, or full fragments when `expand` is set.
    pub async fn by_user(
        stores: &Stores,
        owner_id: &OwnerId,
        expand: bool,
    ) -> FragmentResult<FragmentList> {
        let records = stores.metadata.query_metadata(owner_id).await?;
        if expand {
            let fragments = records
                .into_iter()
                .map(Fragment::from_record)
                .collect::<FragmentResult<Vec<_>>>()?;
            Ok(FragmentList::Expanded(fragments))
        } else {
            Ok(FragmentList::Ids(records.into_iter().map(|r| r.id).collect()))
        }
    }

    /// Delete a fragment's data, then its metadata.
    ///
    /// Either half being absent is not an error, so deleting twice succeeds.
    /// Any other backend failure is returned.
    #[instrument(skip(stores))]
    pub async fn delete(stores: &Stores, owner_id: &OwnerId, id: &FragmentId) -> FragmentResult<()> {
        match stores.data.delete_data(owner_id, id).await {
            Ok(()) | Err(StorageError::NotFound(_)) => {}
            Err(err) => return Err(err.into()),
        }
        match stores.metadata.delete_metadata(owner_id, id).await {
            Ok(()) | Err(MetadataError::NotFound(_)) => Ok(()),
            Err(err) => Err(err.into()),
        }
    }

    fn touch(&mut self) {
        let now = OffsetDateTime::now_utc();
        // Keep timestamps monotonic even if the wall clock steps back.
        self.updated = if now > self.created { now } else { self.created };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_sets_defaults() {
        let fragment = Fragment::new(NewFragment::new("abc", "text/plain")).unwrap();
        assert_eq!(fragment.size(), 0);
        assert_eq!(fragment.created(), fragment.updated());
        assert_eq!(fragment.owner_id().as_str(), "abc");
        assert!(!fragment.id().as_str().is_empty());
    }

    #[test]
    fn test_new_requires_owner_and_type() {
        assert!(matches!(
            Fragment::new(NewFragment::new("", "text/plain")),
            Err(FragmentError::Validation(_))
        ));
        assert!(matches!(
            Fragment::new(NewFragment::new("abc", "")),
            Err(FragmentError::Validation(_))
        ));
    }

    #[test]
    fn test_new_rejects_negative_size() {
        let err = Fragment::new(NewFragment::new("abc", "text/plain").with_size(-1)).unwrap_err();
        assert!(matches!(err, FragmentError::Validation(_)));
    }

    #[test]
    fn test_new_rejects_unsupported_type() {
        let err = Fragment::new(NewFragment::new("abc", "application/msword")).unwrap_err();
        assert!(matches!(err, FragmentError::UnsupportedType(_)));
    }

    #[test]
    fn test_policy_can_exclude_images() {
        let attrs = NewFragment::new("abc", "image/png");
        assert!(Fragment::new(attrs.clone()).is_ok());
        assert!(matches!(
            Fragment::with_policy(attrs, &TypePolicy::text_only()),
            Err(FragmentError::UnsupportedType(_))
        ));
    }

    #[test]
    fn test_mime_type_and_formats() {
        let fragment =
            Fragment::new(NewFragment::new("abc", "text/markdown; charset=utf-8")).unwrap();
        assert_eq!(fragment.media_type(), "text/markdown; charset=utf-8");
        assert_eq!(fragment.mime_type(), "text/markdown");
        assert!(fragment.is_text());
        assert_eq!(
            fragment.formats(),
            vec!["text/markdown", "text/html", "text/plain"]
        );

        let json = Fragment::new(NewFragment::new("abc", "application/json")).unwrap();
        assert!(!json.is_text());
    }

    #[test]
    fn test_serializes_like_record() {
        let fragment = Fragment::new(NewFragment::new("abc", "text/plain").with_id("f1")).unwrap();
        let value = serde_json::to_value(&fragment).unwrap();
        assert_eq!(value["id"], "f1");
        assert_eq!(value["ownerId"], "abc");
        assert_eq!(value["type"], "text/plain");
        assert_eq!(value["size"], 0);
        assert!(value.get("base").is_none());
    }

    #[test]
    fn test_record_conversion() {
        let fragment = Fragment::new(NewFragment::new("abc", "text/html").with_size(10)).unwrap();
        let restored = Fragment::from_record(fragment.to_record()).unwrap();
        assert_eq!(restored, fragment);
    }
}

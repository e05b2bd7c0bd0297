//! Owner identifiers.
//!
//! An owner id is an opaque string naming the party that owns a fragment.
//! Authenticated identities are reduced to an owner id by hashing, so the
//! raw email address never reaches storage.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Opaque identifier of a fragment owner.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct OwnerId(String);

impl OwnerId {
    /// Parse an owner id, rejecting values that are unsafe as a storage key segment.
    pub fn parse(value: impl Into<String>) -> Result<Self> {
        let value = value.into();
        validate_key_segment(&value).map_err(Error::InvalidOwnerId)?;
        Ok(Self(value))
    }

    /// Derive the owner id for an authenticated email address.
    ///
    /// The id is the lowercase hex SHA-256 of the email exactly as given.
    pub fn from_email(email: &str) -> Self {
        let digest = Sha256::digest(email.as_bytes());
        Self(hex_encode(&digest))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for OwnerId {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(value)
    }
}

impl From<OwnerId> for String {
    fn from(id: OwnerId) -> Self {
        id.0
    }
}

impl AsRef<str> for OwnerId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OwnerId({})", self.0)
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Encode bytes as lowercase hex.
pub fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// Identifiers become path segments and object key components, so only
/// ASCII alphanumerics, `-` and `_` are allowed.
pub(crate) fn validate_key_segment(value: &str) -> std::result::Result<(), String> {
    if value.is_empty() {
        return Err("must not be empty".to_string());
    }
    if value.len() > crate::MAX_ID_LEN {
        return Err(format!(
            "length {} exceeds maximum of {}",
            value.len(),
            crate::MAX_ID_LEN
        ));
    }
    if let Some(c) = value
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || *c == '-' || *c == '_'))
    {
        return Err(format!("invalid character {c:?} in {value:?}"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_email_is_sha256_hex() {
        let owner = OwnerId::from_email("user1@email.com");
        assert_eq!(owner.as_str().len(), 64);
        assert!(owner.as_str().chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(owner, OwnerId::from_email("user1@email.com"));
        assert_ne!(owner, OwnerId::from_email("user2@email.com"));
    }

    #[test]
    fn test_from_email_known_vector() {
        // sha256("abc")
        assert_eq!(
            OwnerId::from_email("abc").as_str(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_parse_rejects_unsafe_values() {
        assert!(OwnerId::parse("abc").is_ok());
        assert!(OwnerId::parse("owner_1-a").is_ok());
        assert!(OwnerId::parse("").is_err());
        assert!(OwnerId::parse("../etc").is_err());
        assert!(OwnerId::parse("a/b").is_err());
        assert!(OwnerId::parse("x".repeat(crate::MAX_ID_LEN + 1)).is_err());
    }

    #[test]
    fn test_serde_validates() {
        let owner: OwnerId = serde_json::from_str("\"abc\"").unwrap();
        assert_eq!(owner.to_string(), "abc");
        assert!(serde_json::from_str::<OwnerId>("\"a/b\"").is_err());
    }
}

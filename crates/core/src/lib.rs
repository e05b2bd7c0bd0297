//! Core domain types and shared logic for the fragments service.
//!
//! This crate defines the data model used across all other crates:
//! - Media type policy (supported types, conversion targets, extensions)
//! - Owner and fragment identifiers
//! - The persisted fragment metadata record
//! - Configuration types

pub mod config;
pub mod error;
pub mod fragment;
pub mod media_type;
pub mod owner;

pub use error::{Error, Result};
pub use fragment::{FragmentId, FragmentRecord};
pub use media_type::{
    TypePolicy, base_type, can_convert, conversion_targets, extension_media_type,
    is_supported_type, resolve_target,
};
pub use owner::OwnerId;

/// Default maximum request body size: 5 MiB
pub const DEFAULT_MAX_BODY_BYTES: usize = 5 * 1024 * 1024;

/// Maximum length of an owner or fragment identifier.
pub const MAX_ID_LEN: usize = 128;

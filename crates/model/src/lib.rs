//! Fragment model for the fragments service.
//!
//! A fragment is a piece of owned content split across two stores: its
//! metadata record in a [`MetadataStore`](fragments_metadata::MetadataStore)
//! and its bytes in a [`DataStore`](fragments_storage::DataStore). This
//! crate ties the two together and renders fragment data into other formats.

pub mod convert;
pub mod error;
pub mod fragment;
pub mod stores;

pub use convert::convert;
pub use error::{FragmentError, FragmentResult};
pub use fragment::{Fragment, FragmentList, NewFragment};
pub use stores::Stores;

pub mod stores;

#[allow(unused_imports)]
pub use stores::{FailingDataStore, persistent_stores};

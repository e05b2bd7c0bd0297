pub mod fixtures;

#[allow(unused_imports)]
pub use fixtures::{owner, fragment_id, seeded_bytes};

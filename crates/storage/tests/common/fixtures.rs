use bytes::Bytes;
use fragments_core::{FragmentId, OwnerId};

pub fn owner(name: &str) -> OwnerId {
    OwnerId::parse(name).unwrap()
}

pub fn fragment_id(name: &str) -> FragmentId {
    FragmentId::parse(name).unwrap()
}

/// Generate deterministic test data using a seeded pseudo-random generator
/// Same seed produces same output (reproducible tests)
pub fn seeded_bytes(seed: u64, len: usize) -> Bytes {
    let mut data = vec![0u8; len];
    let mut state = seed;

    for chunk in data.chunks_mut(8) {
        state = state.wrapping_mul(6364136223846793005).wrapping_add(1);
        let bytes = state.to_le_bytes();
        chunk.copy_from_slice(&bytes[..chunk.len()]);
    }

    Bytes::from(data)
}

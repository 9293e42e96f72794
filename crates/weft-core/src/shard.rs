//! Shard key resolution
//!
//! Maps a workflow id to its history shard. Every client in the cluster must
//! agree on this mapping, so the hash is BLAKE3 rather than the randomized
//! std hasher.

use blake3::Hasher;

pub use weft_types::ShardId;

/// Hash a routing key to a stable 32-bit value
fn hash_key(key: &str) -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(key.as_bytes());
    let hash = hasher.finalize();
    let bytes = hash.as_bytes();
    u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
}

/// Route a workflow id to a shard in `[0, number_of_shards)`.
///
/// Callers must pass a non-empty id and a non-zero shard count; the history
/// client rejects empty ids and configuration validation rejects zero shards
/// before this is reached.
pub fn workflow_id_to_shard(workflow_id: &str, number_of_shards: u32) -> ShardId {
    debug_assert!(!workflow_id.is_empty(), "routing key must not be empty");
    debug_assert!(number_of_shards > 0, "shard count must be positive");
    hash_key(workflow_id) % number_of_shards
}

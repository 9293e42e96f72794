//! Shard ownership lookup
//!
//! The history client does not track cluster topology itself. It asks a
//! `ServiceResolver` which host currently owns a shard; the answer may
//! change between two calls while the cluster rebalances.

use parking_lot::RwLock;
use std::collections::HashMap;
use tracing::{debug, info};

use crate::error::RouterError;
use crate::types::HostInfo;
use weft_types::ShardId;

/// Resolves a shard to the host that currently owns it
pub trait ServiceResolver: Send + Sync {
    /// Current owner of `shard_id`
    fn lookup(&self, shard_id: ShardId) -> Result<HostInfo, RouterError>;
}

/// In-memory shard ownership table
#[derive(Debug, Default)]
pub struct StaticResolver {
    owners: RwLock<HashMap<ShardId, HostInfo>>,
}

impl StaticResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spread `number_of_shards` shards round-robin over `addresses`
    pub fn with_hosts(number_of_shards: u32, addresses: &[&str]) -> Self {
        let resolver = Self::new();
        if !addresses.is_empty() {
            let mut owners = resolver.owners.write();
            for shard_id in 0..number_of_shards {
                let address = addresses[shard_id as usize % addresses.len()];
                owners.insert(shard_id, HostInfo::new(address));
            }
        }
        resolver
    }

    /// Assign (or move) a shard to a host
    pub fn assign(&self, shard_id: ShardId, address: impl Into<String>) {
        let host = HostInfo::new(address);
        let mut owners = self.owners.write();
        match owners.insert(shard_id, host.clone()) {
            Some(previous) if previous != host => {
                info!(shard_id, from = %previous, to = %host, "Shard ownership moved");
            }
            Some(_) => {}
            None => {
                debug!(shard_id, owner = %host, "Shard assigned");
            }
        }
    }

    /// Assign every shard in `shards` to one host
    pub fn assign_range(&self, shards: std::ops::Range<ShardId>, address: &str) {
        let host = HostInfo::new(address);
        let count = shards.end.saturating_sub(shards.start);
        let mut owners = self.owners.write();
        for shard_id in shards {
            owners.insert(shard_id, host.clone());
        }
        info!(owner = %host, count, "Shard range assigned");
    }

    /// Forget the owner of a shard
    pub fn remove(&self, shard_id: ShardId) -> Option<HostInfo> {
        let removed = self.owners.write().remove(&shard_id);
        if removed.is_some() {
            info!(shard_id, "Shard owner removed");
        }
        removed
    }

    /// Number of shards with a known owner
    pub fn owned_shard_count(&self) -> usize {
        self.owners.read().len()
    }
}

impl ServiceResolver for StaticResolver {
    fn lookup(&self, shard_id: ShardId) -> Result<HostInfo, RouterError> {
        self.owners
            .read()
            .get(&shard_id)
            .cloned()
            .ok_or(RouterError::NoOwner { shard_id })
    }
}

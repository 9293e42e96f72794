//! Per-host connection cache
//!
//! Setting up a connection is expensive, so one connection is created per
//! host address and shared by every request to that host. Entries are never
//! evicted: addresses are reused as shards move around the same cluster.

use std::sync::Arc;
use tracing::debug;

use weft_core::LazyMap;

use crate::error::RouterError;
use crate::types::{HistoryConnection, HostAddress};

/// Builds a connection to one history host
pub trait ConnectionFactory: Send + Sync {
    /// Set up a connection to `address`
    fn create_connection(&self, address: &str) -> Result<HistoryConnection, RouterError>;
}

/// Cache of connections keyed by host address
pub struct ConnectionCache {
    factory: Arc<dyn ConnectionFactory>,
    connections: LazyMap<HostAddress, HistoryConnection>,
}

impl ConnectionCache {
    pub fn new(factory: Arc<dyn ConnectionFactory>) -> Self {
        Self {
            factory,
            connections: LazyMap::new(),
        }
    }

    /// Connection for `address`, created on first use.
    ///
    /// Creation failures are returned to this caller and nothing is cached.
    pub fn get(&self, address: &str) -> Result<HistoryConnection, RouterError> {
        self.connections.get_or_try_create(address, || {
            let connection = self.factory.create_connection(address)?;
            debug!(address = %address, "Created history connection");
            Ok(connection)
        })
    }

    /// Number of cached connections
    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }
}

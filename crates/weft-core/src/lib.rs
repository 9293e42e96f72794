//! Weft Core - Shared library for the history and visibility clients
//!
//! This crate provides common functionality used by both
//! weft-router-core and weft-visibility.

pub mod config;
pub mod lazy_map;
pub mod shard;

pub use config::{ClientConfig, ConfigError, DomainQps, SamplingConfig};
pub use lazy_map::LazyMap;
pub use shard::{workflow_id_to_shard, ShardId};

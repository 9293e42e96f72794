//! Weft Router - Shard-aware history client
//!
//! Routes history service calls to the host that owns the workflow's shard,
//! and follows the cluster when shards move.
//!
//! # Architecture
//!
//! ```text
//! HistoryClient call
//!     │
//!     ▼
//! ┌─────────────────────────┐
//! │   workflow_id_to_shard  │  Which shard?
//! └───────────┬─────────────┘
//!             │
//!             ▼
//! ┌─────────────────────────┐
//! │     ServiceResolver     │  Which host owns it?
//! └───────────┬─────────────┘
//!             │
//!             ▼
//! ┌─────────────────────────┐
//! │     ConnectionCache     │  One connection per host
//! └───────────┬─────────────┘
//!             │
//!             ▼
//! ┌─────────────────────────┐
//! │      Redirect loop      │  Follows ShardOwnershipLost
//! └─────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use weft_router_core::{CallContext, HistoryClient, StaticResolver};
//!
//! let resolver = Arc::new(StaticResolver::with_hosts(16, &["10.0.0.1:7934"]));
//! let client = HistoryClient::new(ClientConfig::with_shards(16), resolver, factory)?;
//!
//! let ctx = CallContext::with_timeout(Duration::from_secs(10));
//! client.signal_workflow_execution(&ctx, request).await?;
//! ```

// Core modules
mod error;
mod types;
mod context;

// Collaborators
mod membership;
mod connection;
mod token;
mod service;

// Dispatcher
mod client;

// Re-exports: Error types
pub use error::RouterError;

// Re-exports: Core types
pub use types::{HistoryConnection, HostAddress, HostInfo, HISTORY_SERVICE_NAME};
pub use context::CallContext;

// Re-exports: Collaborator traits and implementations
pub use membership::{ServiceResolver, StaticResolver};
pub use connection::{ConnectionCache, ConnectionFactory};
pub use token::{JsonTaskTokenSerializer, TaskTokenSerializer};
pub use service::HistoryService;

// Re-exports: Client
pub use client::HistoryClient;

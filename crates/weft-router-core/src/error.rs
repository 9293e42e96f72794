//! Error types for the history client

use thiserror::Error;
use weft_core::ConfigError;
use weft_types::ShardId;

/// History client error types
#[derive(Debug, Error)]
pub enum RouterError {
    /// The addressed host no longer owns the shard.
    ///
    /// This is the only error the redirect loop retries, and only when the
    /// new owner is named.
    #[error("Shard ownership lost (new owner: {owner:?}): {message}")]
    ShardOwnershipLost {
        owner: Option<String>,
        message: String,
    },

    /// Membership has no owner for the shard
    #[error("No owner known for shard {shard_id}")]
    NoOwner { shard_id: ShardId },

    /// Membership lookup failed
    #[error("Membership lookup failed: {0}")]
    Membership(String),

    /// Task token could not be decoded
    #[error("Malformed task token: {0}")]
    MalformedToken(String),

    /// Request carried an empty workflow id
    #[error("Routing key must not be empty")]
    EmptyRoutingKey,

    /// Caller deadline or per-attempt timeout elapsed
    #[error("Deadline exceeded")]
    DeadlineExceeded,

    /// Caller cancelled the call
    #[error("Call cancelled")]
    Cancelled,

    /// Connection to a host could not be set up
    #[error("Transport error for {address}: {reason}")]
    Transport { address: String, reason: String },

    #[error("Entity not exists: {0}")]
    EntityNotExists(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Service busy: {0}")]
    ServiceBusy(String),

    #[error("Internal service error: {0}")]
    Internal(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(#[from] ConfigError),
}

impl RouterError {
    /// New owner named by an ownership-lost signal
    pub fn redirect_target(&self) -> Option<&str> {
        match self {
            RouterError::ShardOwnershipLost { owner, .. } => owner.as_deref(),
            _ => None,
        }
    }

    /// Ownership-lost signal naming `owner`
    pub fn ownership_lost(owner: impl Into<String>) -> Self {
        RouterError::ShardOwnershipLost {
            owner: Some(owner.into()),
            message: "shard moved".to_string(),
        }
    }
}

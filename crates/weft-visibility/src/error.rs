//! Error types for the visibility store

use thiserror::Error;

/// Visibility persistence error types
#[derive(Debug, Error)]
pub enum VisibilityError {
    /// No record for the requested execution
    #[error("Entity not exists: {0}")]
    EntityNotExists(String),

    /// Backing store failed the operation
    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Service busy: {0}")]
    ServiceBusy(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type VisibilityResult<T> = Result<T, VisibilityError>;

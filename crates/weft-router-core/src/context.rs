//! Caller deadline and cancellation
//!
//! A `CallContext` travels with every history call. Clones share the same
//! cancellation flag, so a caller can keep one clone and cancel the call
//! from another task.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

use crate::error::RouterError;

/// Ambient deadline and cancellation signal for one logical call
#[derive(Debug, Clone, Default)]
pub struct CallContext {
    deadline: Option<Instant>,
    cancelled: Arc<AtomicBool>,
}

impl CallContext {
    /// Context with no deadline
    pub fn background() -> Self {
        Self::default()
    }

    /// Context that expires `timeout` from now
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::with_deadline(Instant::now() + timeout)
    }

    /// Context that expires at `deadline`
    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            deadline: Some(deadline),
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Cancel this context and every clone of it
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// Time left before the deadline, `None` without a deadline
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
    }

    /// Fail if the context is cancelled or its deadline has passed
    pub fn check(&self) -> Result<(), RouterError> {
        if self.is_cancelled() {
            return Err(RouterError::Cancelled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Err(RouterError::DeadlineExceeded),
            _ => Ok(()),
        }
    }

    /// The sooner of `default` and the remaining caller time
    pub fn effective_timeout(&self, default: Duration) -> Duration {
        match self.remaining() {
            Some(remaining) => remaining.min(default),
            None => default,
        }
    }
}

//! Weft Visibility - Sampled visibility persistence
//!
//! Per-domain admission control in front of the visibility store. Record
//! writes over a domain's quota are dropped silently; reads pass through.
//!
//! # Architecture
//!
//! ```text
//! record_workflow_execution_{started,closed}
//!     │
//!     ▼
//! ┌──────────────────────────┐
//! │    DomainToBucketMap     │  One limiter per (class, domain)
//! └────────────┬─────────────┘
//!              │ try_acquire(priority, 1)
//!              ▼
//! ┌──────────────────────────┐
//! │ FullPriorityTokenBucket  │
//! └────────────┬─────────────┘
//!        admit │ deny
//!         ┌────┴────┐
//!         ▼         ▼
//!    downstream   log + count, Ok(())
//! ```

mod error;
mod manager;
mod priority_bucket;
mod bucket_map;
mod sampling;

pub use error::{VisibilityError, VisibilityResult};
pub use manager::VisibilityManager;
pub use priority_bucket::{FullPriorityTokenBucket, PriorityTokenBucket, RealTimeSource, TimeSource};
pub use bucket_map::{BucketFactory, DomainToBucketMap, RealBucketFactory};
pub use sampling::{closed_record_priority, SamplingStats, VisibilitySamplingClient};

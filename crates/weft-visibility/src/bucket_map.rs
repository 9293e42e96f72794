//! Per-domain rate limiters
//!
//! One `DomainToBucketMap` per traffic class. A domain's limiter is built on
//! first use with the quota in force at that moment and kept for the life
//! of the map.

use std::num::NonZeroUsize;
use std::sync::Arc;
use tracing::info;
use weft_core::LazyMap;

use crate::priority_bucket::{FullPriorityTokenBucket, PriorityTokenBucket, RealTimeSource};

/// Builds the limiter for a newly seen domain
pub trait BucketFactory: Send + Sync {
    fn create_bucket(&self, num_priorities: NonZeroUsize, qps: u32) -> Arc<dyn PriorityTokenBucket>;
}

/// `FullPriorityTokenBucket` on the real clock
#[derive(Debug, Default, Clone, Copy)]
pub struct RealBucketFactory;

impl BucketFactory for RealBucketFactory {
    fn create_bucket(
        &self,
        num_priorities: NonZeroUsize,
        qps: u32,
    ) -> Arc<dyn PriorityTokenBucket> {
        Arc::new(FullPriorityTokenBucket::new(
            num_priorities,
            qps,
            Arc::new(RealTimeSource::new()),
        ))
    }
}

/// Domain name to limiter, created at most once per domain
pub struct DomainToBucketMap {
    class: &'static str,
    factory: Arc<dyn BucketFactory>,
    buckets: LazyMap<String, Arc<dyn PriorityTokenBucket>>,
}

impl DomainToBucketMap {
    pub fn new(class: &'static str) -> Self {
        Self::with_factory(class, Arc::new(RealBucketFactory))
    }

    pub fn with_factory(class: &'static str, factory: Arc<dyn BucketFactory>) -> Self {
        Self {
            class,
            factory,
            buckets: LazyMap::new(),
        }
    }

    /// The domain's limiter, built with `num_priorities` and `qps` if new
    pub fn get_rate_limiter(
        &self,
        domain: &str,
        num_priorities: NonZeroUsize,
        qps: u32,
    ) -> Arc<dyn PriorityTokenBucket> {
        self.buckets.get_or_create(domain, || {
            info!(
                class = self.class,
                domain = %domain,
                num_priorities = num_priorities.get(),
                qps,
                "Creating visibility rate limiter"
            );
            self.factory.create_bucket(num_priorities, qps)
        })
    }

    /// Number of domains with a limiter
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}

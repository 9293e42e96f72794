//! Priority token bucket
//!
//! A single bucket shared by several priority levels. The bucket holds up to
//! `qps` tokens and refills at `qps` tokens per second. Higher priority
//! indexes are more favored: each lower level must leave a slice of the
//! bucket untouched, so under load the favored level keeps getting tokens
//! after the others are cut off.
//!
//! ```text
//! n = 2, qps = 10
//!
//! tokens  10 ─┬─ priority 0 and 1 admitted
//!             │
//!          5 ─┼─ priority 0 denied from here down
//!             │  priority 1 admitted
//!          0 ─┴─ everyone denied
//! ```

use parking_lot::Mutex;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Instant;

const MICROS_PER_SECOND: u128 = 1_000_000;

/// Monotonic clock in microseconds
pub trait TimeSource: Send + Sync {
    fn now_micros(&self) -> u64;
}

/// Wall-clock time source backed by `Instant`
#[derive(Debug, Clone, Copy)]
pub struct RealTimeSource {
    origin: Instant,
}

impl RealTimeSource {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for RealTimeSource {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for RealTimeSource {
    fn now_micros(&self) -> u64 {
        u64::try_from(self.origin.elapsed().as_micros()).unwrap_or(u64::MAX)
    }
}

/// Non-blocking admission by priority
pub trait PriorityTokenBucket: Send + Sync {
    /// Take `count` tokens at `priority` if the bucket allows it
    fn try_acquire(&self, priority: usize, count: u32) -> bool;
}

#[derive(Debug)]
struct BucketState {
    tokens: u64,
    last_refill_us: u64,
}

/// Token bucket with reserved headroom for favored priorities
pub struct FullPriorityTokenBucket {
    num_priorities: usize,
    capacity: u64,
    time_source: Arc<dyn TimeSource>,
    state: Mutex<BucketState>,
}

impl FullPriorityTokenBucket {
    /// Create a full bucket of `qps` tokens
    pub fn new(num_priorities: NonZeroUsize, qps: u32, time_source: Arc<dyn TimeSource>) -> Self {
        let now = time_source.now_micros();
        Self {
            num_priorities: num_priorities.get(),
            capacity: u64::from(qps),
            time_source,
            state: Mutex::new(BucketState {
                tokens: u64::from(qps),
                last_refill_us: now,
            }),
        }
    }

    pub fn num_priorities(&self) -> usize {
        self.num_priorities
    }

    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    /// Tokens currently in the bucket, after refilling
    pub fn available_tokens(&self) -> u64 {
        let mut state = self.state.lock();
        self.refill(&mut state);
        state.tokens
    }

    /// Tokens `priority` must leave in the bucket
    fn reserved_for(&self, priority: usize) -> u64 {
        let favored_above = (self.num_priorities - 1 - priority) as u64;
        self.capacity * favored_above / self.num_priorities as u64
    }

    fn refill(&self, state: &mut BucketState) {
        let now = self.time_source.now_micros();
        if now <= state.last_refill_us || self.capacity == 0 {
            return;
        }

        if state.tokens >= self.capacity {
            // A full bucket does not bank idle time
            state.last_refill_us = now;
            return;
        }

        let elapsed_us = u128::from(now - state.last_refill_us);
        let rate = u128::from(self.capacity);
        let tokens_to_add = elapsed_us * rate / MICROS_PER_SECOND;
        if tokens_to_add == 0 {
            return;
        }

        // Advance only by the time the added tokens account for, so partial
        // tokens keep accruing across calls
        let consumed_us = tokens_to_add * MICROS_PER_SECOND / rate;
        state.last_refill_us += u64::try_from(consumed_us).unwrap_or(u64::MAX);

        let tokens_to_add = u64::try_from(tokens_to_add).unwrap_or(u64::MAX);
        state.tokens = state.tokens.saturating_add(tokens_to_add).min(self.capacity);
        if state.tokens == self.capacity {
            state.last_refill_us = now;
        }
    }
}

impl PriorityTokenBucket for FullPriorityTokenBucket {
    fn try_acquire(&self, priority: usize, count: u32) -> bool {
        if priority >= self.num_priorities {
            return false;
        }

        let mut state = self.state.lock();
        self.refill(&mut state);

        let needed = u64::from(count) + self.reserved_for(priority);
        if state.tokens < needed {
            return false;
        }
        state.tokens -= u64::from(count);
        true
    }
}

impl std::fmt::Debug for FullPriorityTokenBucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FullPriorityTokenBucket")
            .field("num_priorities", &self.num_priorities)
            .field("capacity", &self.capacity)
            .field("state", &*self.state.lock())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};

    #[derive(Default)]
    struct ManualTimeSource {
        now_us: AtomicU64,
    }

    impl ManualTimeSource {
        fn advance_ms(&self, ms: u64) {
            self.now_us.fetch_add(ms * 1_000, Ordering::SeqCst);
        }
    }

    impl TimeSource for ManualTimeSource {
        fn now_micros(&self) -> u64 {
            self.now_us.load(Ordering::SeqCst)
        }
    }

    fn bucket(priorities: usize, qps: u32) -> (FullPriorityTokenBucket, Arc<ManualTimeSource>) {
        let clock = Arc::new(ManualTimeSource::default());
        let bucket = FullPriorityTokenBucket::new(
            NonZeroUsize::new(priorities).unwrap(),
            qps,
            clock.clone(),
        );
        (bucket, clock)
    }

    #[test]
    fn test_starts_full() {
        let (bucket, _clock) = bucket(1, 10);

        for _ in 0..10 {
            assert!(bucket.try_acquire(0, 1));
        }
        assert!(!bucket.try_acquire(0, 1));
    }

    #[test]
    fn test_refills_at_qps() {
        let (bucket, clock) = bucket(1, 10);
        while bucket.try_acquire(0, 1) {}

        clock.advance_ms(500);
        assert_eq!(bucket.available_tokens(), 5);

        // Partial tokens carry over to the next refill
        clock.advance_ms(50);
        assert_eq!(bucket.available_tokens(), 5);
        clock.advance_ms(50);
        assert_eq!(bucket.available_tokens(), 6);
    }

    #[test]
    fn test_refill_capped_at_capacity() {
        let (bucket, clock) = bucket(1, 10);
        assert!(bucket.try_acquire(0, 3));

        clock.advance_ms(60_000);
        assert_eq!(bucket.available_tokens(), 10);
    }

    #[test]
    fn test_lower_priority_leaves_headroom() {
        let (bucket, _clock) = bucket(2, 10);

        let mut low = 0;
        while bucket.try_acquire(0, 1) {
            low += 1;
        }
        assert_eq!(low, 5);

        let mut high = 0;
        while bucket.try_acquire(1, 1) {
            high += 1;
        }
        assert_eq!(high, 5);
    }

    #[test]
    fn test_favored_priority_uses_whole_bucket() {
        let (bucket, _clock) = bucket(2, 10);

        assert!(bucket.try_acquire(1, 10));
        assert!(!bucket.try_acquire(1, 1));
        assert!(!bucket.try_acquire(0, 1));
    }

    #[test]
    fn test_priority_out_of_range_denied() {
        let (bucket, _clock) = bucket(2, 10);
        assert!(!bucket.try_acquire(2, 1));
        assert_eq!(bucket.available_tokens(), 10);
    }

    #[test]
    fn test_zero_qps_denies_everything() {
        let (bucket, clock) = bucket(1, 0);
        assert!(!bucket.try_acquire(0, 1));

        clock.advance_ms(10_000);
        assert!(!bucket.try_acquire(0, 1));
    }

    #[test]
    fn test_multi_token_acquire() {
        let (bucket, _clock) = bucket(1, 10);
        assert!(bucket.try_acquire(0, 7));
        assert!(!bucket.try_acquire(0, 4));
        assert!(bucket.try_acquire(0, 3));
    }
}

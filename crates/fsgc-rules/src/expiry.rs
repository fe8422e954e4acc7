//! TTL expiry decisions.

use std::time::{Duration, SystemTime};

/// Source of the current time.
pub trait Clock {
    /// The current time.
    fn now(&self) -> SystemTime;
}

/// The system wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> SystemTime {
        SystemTime::now()
    }
}

/// A clock stopped at a fixed instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub SystemTime);

impl Clock for FixedClock {
    fn now(&self) -> SystemTime {
        self.0
    }
}

/// Age of an entry at `now`. Modification times in the future count as zero.
pub fn age_at(now: SystemTime, modified: SystemTime) -> Duration {
    now.duration_since(modified).unwrap_or(Duration::ZERO)
}

/// Whether an entry modified at `modified` has outlived `ttl` at `now`.
///
/// The boundary is strict: an entry exactly `ttl` old is kept.
pub fn is_expired_at(ttl: Duration, modified: SystemTime, now: SystemTime) -> bool {
    age_at(now, modified) > ttl
}

/// Decides whether an entry's age exceeds its TTL.
///
/// The clock is sampled on every evaluation, so entries can expire while a
/// long walk is still running.
pub struct ExpiryEvaluator {
    clock: Box<dyn Clock>,
}

impl ExpiryEvaluator {
    /// Create an evaluator using the system clock.
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }

    /// Create an evaluator using a custom clock.
    pub fn with_clock(clock: impl Clock + 'static) -> Self {
        Self {
            clock: Box::new(clock),
        }
    }

    /// Whether an entry modified at `modified` has outlived `ttl`.
    pub fn is_expired(&self, ttl: Duration, modified: SystemTime) -> bool {
        is_expired_at(ttl, modified, self.clock.now())
    }
}

impl Default for ExpiryEvaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ExpiryEvaluator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExpiryEvaluator").finish_non_exhaustive()
    }
}

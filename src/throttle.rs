//! Client-side rate limiting between service calls.
//!
//! The batch deliberately paces itself to avoid tripping the transformation
//! service's rate limits. The gate sits behind a small trait so the pacing
//! policy can be swapped (adaptive backoff, a shared limiter for concurrent
//! workers) without touching the pipeline.

use std::thread;
use std::time::Duration;

/// A pacing gate invoked between consecutive service calls.
pub trait Throttle {
    /// Blocks until the next call may proceed.
    fn pause(&self);
}

/// Fixed-delay gate: every pause sleeps for the same configured duration.
///
/// This is a protective client-side limit, not a correctness mechanism.
#[derive(Debug, Clone)]
pub struct FixedDelayGate {
    delay: Duration,
}

impl FixedDelayGate {
    /// Creates a gate with the given inter-call delay.
    #[must_use]
    pub const fn new(delay: Duration) -> Self {
        Self { delay }
    }

    /// Returns the configured delay.
    #[must_use]
    pub const fn delay(&self) -> Duration {
        self.delay
    }
}

impl Throttle for FixedDelayGate {
    fn pause(&self) {
        if !self.delay.is_zero() {
            thread::sleep(self.delay);
        }
    }
}

/// Gate that never waits. Used in tests and dry runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoThrottle;

impl Throttle for NoThrottle {
    fn pause(&self) {}
}

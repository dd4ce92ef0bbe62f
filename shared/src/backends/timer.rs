use std::time::{Duration, Instant};

/// A repeating interval timer driven by the caller's clock.
///
/// The tick driver passes `now` in explicitly, which keeps every consumer
/// deterministic under test.
pub struct Timer {
    interval: Duration,
    last: Instant,
}

impl Timer {
    pub fn new(interval: Duration, now: Instant) -> Self {
        Self {
            interval,
            last: now,
        }
    }

    /// Returns whether the interval has elapsed since the last reset.
    pub fn ringing(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.last) >= self.interval
    }

    pub fn reset(&mut self, now: Instant) {
        self.last = now;
    }
}

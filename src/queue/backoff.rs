//! Idle and retry backoff for the consumer loop.
//!
//! The original polled an empty queue with immediate retries; this
//! curve replaces that busy loop.

use std::time::Duration;

/// Capped exponential backoff.
///
/// The delay doubles from `base` up to `cap`; `reset` returns to the
/// start of the curve. Used both for empty-queue idling and for
/// transient backend retries.
#[derive(Debug, Clone)]
pub struct Backoff {
    base: Duration,
    cap: Duration,
    attempt: u32,
}

impl Backoff {
    pub fn new(base: Duration, cap: Duration) -> Self {
        Self {
            base,
            cap,
            attempt: 0,
        }
    }

    /// Delay for the current attempt, then advance the curve.
    pub fn next_delay(&mut self) -> Duration {
        let delay = self.delay_for(self.attempt);
        self.attempt = self.attempt.saturating_add(1);
        delay
    }

    /// Return to the start of the curve.
    pub fn reset(&mut self) {
        self.attempt = 0;
    }

    fn delay_for(&self, attempt: u32) -> Duration {
        let exp = attempt.min(16);
        let factor = 1u64.checked_shl(exp).unwrap_or(u64::MAX);
        let base_ms = self.base.as_millis() as u64;
        let cap_ms = self.cap.as_millis() as u64;
        let delay_ms = base_ms.saturating_mul(factor);
        Duration::from_millis(delay_ms.min(cap_ms))
    }
}

impl Default for Backoff {
    /// Exponential backoff starting at 100ms, capped at 5s.
    fn default() -> Self {
        Self::new(Duration::from_millis(100), Duration::from_secs(5))
    }
}

//! Capped exponential backoff for polling intervals.

use std::time::Duration;

/// Doubling delay, capped at `max`.
#[derive(Debug, Clone)]
pub struct Backoff {
    current: Duration,
    max: Duration,
}

impl Backoff {
    pub fn new(initial: Duration, max: Duration) -> Self {
        Self {
            current: initial.min(max),
            max,
        }
    }

    /// Delay to sleep before the next attempt.
    pub fn current(&self) -> Duration {
        self.current
    }

    /// Double the delay, capped at `max`.
    pub fn advance(&mut self) {
        self.current = self.current.saturating_mul(2).min(self.max);
    }
}

impl Iterator for Backoff {
    type Item = Duration;

    fn next(&mut self) -> Option<Duration> {
        let delay = self.current;
        self.advance();
        Some(delay)
    }
}

//! Time source for the simulator.

use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

/// Supplies the current instant to the job state machine.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// Wall clock backed by [`Instant::now`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Clock that only moves when told to.
///
/// With a non-zero `step`, every call to [`Clock::now`] also advances the
/// clock by that amount, so consecutive observations are always strictly
/// ordered.
#[derive(Debug)]
pub struct ManualClock {
    origin: Instant,
    offset: Mutex<Duration>,
    step: Duration,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::with_step(Duration::ZERO)
    }

    pub fn with_step(step: Duration) -> Self {
        Self {
            origin: Instant::now(),
            offset: Mutex::new(Duration::ZERO),
            step,
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut offset = self.offset.lock().unwrap_or_else(PoisonError::into_inner);
        *offset += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        let mut offset = self.offset.lock().unwrap_or_else(PoisonError::into_inner);
        let now = self.origin + *offset;
        *offset += self.step;
        now
    }
}

//! Server-side job simulator.
//!
//! [`Simulator`] owns exactly one [`Job`] in a guarded slot shared by every
//! caller. Resetting replaces the job in that slot with a fresh one rather
//! than rewinding the old one, so a caller still polling the previous job
//! simply starts observing the new one.

mod clock;
mod job;
mod random;
pub mod server;

pub use clock::{Clock, ManualClock, SystemClock};
pub use job::Job;
pub use random::{RandomSource, ScriptedRandom, StdRandom};
pub use server::{router, serve};

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::contract::JobState;

/// Settings applied to every job the simulator creates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulatorConfig {
    /// Time a job stays pending before its outcome may be decided.
    pub delay: Duration,
    /// Probability in `[0, 1]` that a resolved job ends in `error`.
    pub error_probability: f64,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            delay: Duration::from_millis(5_000),
            error_probability: 0.1,
        }
    }
}

/// Single-tenant job simulator.
pub struct Simulator {
    config: SimulatorConfig,
    clock: Arc<dyn Clock>,
    random: Mutex<Box<dyn RandomSource>>,
    job: Mutex<Job>,
}

impl Simulator {
    /// Simulator on the wall clock with an entropy-seeded outcome source.
    pub fn new(config: SimulatorConfig) -> Self {
        Self::with_sources(
            config,
            Arc::new(SystemClock),
            Box::new(StdRandom::from_entropy()),
        )
    }

    /// Simulator with an injected clock and random source.
    pub fn with_sources(
        config: SimulatorConfig,
        clock: Arc<dyn Clock>,
        random: Box<dyn RandomSource>,
    ) -> Self {
        let job = Job::new(clock.now(), config.delay, config.error_probability);
        Self {
            config,
            clock,
            random: Mutex::new(random),
            job: Mutex::new(job),
        }
    }

    pub fn config(&self) -> SimulatorConfig {
        self.config
    }

    /// Replace the current job with a fresh pending one using the configured
    /// delay and error probability.
    pub fn reset(&self) {
        self.reset_with(self.config.delay, self.config.error_probability);
    }

    /// Replace the current job with a fresh pending one.
    pub fn reset_with(&self, delay: Duration, error_probability: f64) {
        let fresh = Job::new(self.clock.now(), delay, error_probability);
        *self.job_slot() = fresh;
        tracing::info!(
            delay_ms = delay.as_millis() as u64,
            error_probability,
            "job reset"
        );
    }

    /// Observe the current job, resolving it if its delay has elapsed.
    pub fn check_status(&self) -> JobState {
        let mut job = self.job_slot();
        let before = job.state();
        let now = self.clock.now();
        let after = {
            let mut random = self.random.lock().unwrap_or_else(PoisonError::into_inner);
            job.check(now, random.as_mut())
        };
        if before != after {
            tracing::info!(result = %after, "job resolved");
        }
        after
    }

    /// Snapshot of the current job.
    pub fn job(&self) -> Job {
        self.job_slot().clone()
    }

    fn job_slot(&self) -> MutexGuard<'_, Job> {
        self.job.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn simulator(
        delay_ms: u64,
        error_probability: f64,
        draw: f64,
    ) -> (Simulator, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new());
        let sim = Simulator::with_sources(
            SimulatorConfig {
                delay: Duration::from_millis(delay_ms),
                error_probability,
            },
            clock.clone(),
            Box::new(ScriptedRandom::constant(draw)),
        );
        (sim, clock)
    }

    #[test]
    fn default_config_values() {
        let config = SimulatorConfig::default();
        assert_eq!(config.delay, Duration::from_millis(5_000));
        assert_eq!(config.error_probability, 0.1);
    }

    #[test]
    fn fresh_simulator_is_pending() {
        let (sim, _clock) = simulator(5_000, 0.1, 0.5);
        assert_eq!(sim.check_status(), JobState::Pending);
    }

    #[test]
    fn repeated_checks_before_delay_do_not_mutate() {
        let (sim, clock) = simulator(1_000, 0.1, 0.5);
        for _ in 0..10 {
            assert_eq!(sim.check_status(), JobState::Pending);
            clock.advance(Duration::from_millis(100));
        }
        assert_eq!(sim.job().state(), JobState::Pending);
    }

    #[test]
    fn resolves_after_delay_and_sticks() {
        let (sim, clock) = simulator(1_000, 0.1, 0.5);
        clock.advance(Duration::from_millis(1_001));
        assert_eq!(sim.check_status(), JobState::Completed);

        clock.advance(Duration::from_secs(60));
        assert_eq!(sim.check_status(), JobState::Completed);
    }

    #[test]
    fn reset_yields_fresh_pending_job() {
        let (sim, clock) = simulator(1_000, 1.0, 0.5);
        clock.advance(Duration::from_secs(2));
        assert_eq!(sim.check_status(), JobState::Error);

        sim.reset();
        assert_eq!(sim.check_status(), JobState::Pending);
        assert_eq!(sim.job().started_at(), clock.now());
    }

    #[test]
    fn reset_through_one_handle_is_seen_by_every_handle() {
        let (sim, clock) = simulator(1_000, 0.1, 0.5);
        let sim = Arc::new(sim);
        let other = Arc::clone(&sim);

        clock.advance(Duration::from_millis(1_500));
        assert_eq!(sim.check_status(), JobState::Completed);

        std::thread::spawn(move || other.reset())
            .join()
            .expect("reset thread panicked");

        assert_eq!(sim.check_status(), JobState::Pending);
        assert_eq!(sim.job().started_at(), clock.now());
        clock.advance(Duration::from_millis(1_001));
        assert_eq!(sim.check_status(), JobState::Completed);
    }

    #[test]
    fn reset_with_overrides_job_settings() {
        let (sim, clock) = simulator(5_000, 0.1, 0.5);
        sim.reset_with(Duration::from_millis(10), 0.9);

        let job = sim.job();
        assert_eq!(job.delay(), Duration::from_millis(10));
        assert_eq!(job.error_probability(), 0.9);

        clock.advance(Duration::from_millis(11));
        assert_eq!(sim.check_status(), JobState::Error);
        // Configured defaults are untouched by a one-off reset.
        assert_eq!(sim.config().delay, Duration::from_millis(5_000));
    }
}

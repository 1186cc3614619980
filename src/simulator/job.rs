use std::time::{Duration, Instant};

use crate::contract::JobState;

use super::random::RandomSource;

/// A single simulated job.
///
/// The outcome is decided lazily: the first observation after `delay` has
/// elapsed flips a weighted coin and stores the result. Later observations
/// return the stored terminal state without drawing again.
#[derive(Debug, Clone)]
pub struct Job {
    started_at: Instant,
    delay: Duration,
    error_probability: f64,
    state: JobState,
}

impl Job {
    pub fn new(started_at: Instant, delay: Duration, error_probability: f64) -> Self {
        Self {
            started_at,
            delay,
            error_probability,
            state: JobState::Pending,
        }
    }

    pub fn state(&self) -> JobState {
        self.state
    }

    pub fn started_at(&self) -> Instant {
        self.started_at
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn error_probability(&self) -> f64 {
        self.error_probability
    }

    /// Observe the job at `now`, resolving it if it is due.
    ///
    /// - terminal: returned as is, `random` is not touched
    /// - `now - started_at > delay`: one draw `u`; `u > error_probability`
    ///   resolves to `Completed`, anything else to `Error`
    /// - otherwise stays `Pending`
    pub fn check(&mut self, now: Instant, random: &mut dyn RandomSource) -> JobState {
        if self.state.is_terminal() {
            return self.state;
        }

        let elapsed = now.saturating_duration_since(self.started_at);
        if elapsed > self.delay {
            self.state = if random.next_unit() > self.error_probability {
                JobState::Completed
            } else {
                JobState::Error
            };
        }

        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulator::random::{ScriptedRandom, StdRandom};

    const DELAY: Duration = Duration::from_millis(5_000);

    #[test]
    fn stays_pending_before_delay() {
        let start = Instant::now();
        let mut job = Job::new(start, DELAY, 0.5);
        let mut random = ScriptedRandom::constant(0.9);

        for ms in [0, 1, 2_500, 5_000] {
            let state = job.check(start + Duration::from_millis(ms), &mut random);
            assert_eq!(state, JobState::Pending);
        }
        assert_eq!(job.state(), JobState::Pending);
    }

    #[test]
    fn delay_boundary_is_exclusive() {
        let start = Instant::now();
        let mut job = Job::new(start, DELAY, 0.0);
        let mut random = ScriptedRandom::constant(0.5);

        assert_eq!(job.check(start + DELAY, &mut random), JobState::Pending);
        assert_eq!(
            job.check(start + DELAY + Duration::from_millis(1), &mut random),
            JobState::Completed
        );
    }

    #[test]
    fn draw_above_probability_completes() {
        let start = Instant::now();
        let mut job = Job::new(start, DELAY, 0.1);
        let mut random = ScriptedRandom::constant(0.11);

        let state = job.check(start + DELAY * 2, &mut random);
        assert_eq!(state, JobState::Completed);
    }

    #[test]
    fn draw_at_or_below_probability_errors() {
        let start = Instant::now();
        let later = start + DELAY * 2;

        let mut job = Job::new(start, DELAY, 0.1);
        assert_eq!(
            job.check(later, &mut ScriptedRandom::constant(0.1)),
            JobState::Error
        );

        let mut job = Job::new(start, DELAY, 0.1);
        assert_eq!(
            job.check(later, &mut ScriptedRandom::constant(0.05)),
            JobState::Error
        );
    }

    #[test]
    fn terminal_state_is_never_rerolled() {
        let start = Instant::now();
        let mut job = Job::new(start, DELAY, 0.5);
        // First draw errors, every later draw would complete.
        let mut random = ScriptedRandom::new([0.1, 0.99]);

        let first = job.check(start + DELAY * 2, &mut random);
        assert_eq!(first, JobState::Error);
        for n in 3..10 {
            assert_eq!(job.check(start + DELAY * n, &mut random), JobState::Error);
        }
        // The second scripted draw was never consumed.
        assert_eq!(random.next_unit(), 0.99);
    }

    #[test]
    fn error_frequency_tracks_probability() {
        let start = Instant::now();
        let later = start + DELAY * 2;
        let mut random = StdRandom::seeded(0x5eed);

        for probability in [0.0, 0.1, 0.5, 0.9, 1.0] {
            let trials = 10_000;
            let errors = (0..trials)
                .filter(|_| {
                    let mut job = Job::new(start, DELAY, probability);
                    job.check(later, &mut random) == JobState::Error
                })
                .count();
            let frequency = errors as f64 / trials as f64;
            assert!(
                (frequency - probability).abs() < 0.03,
                "p={probability} observed {frequency}"
            );
        }
    }
}

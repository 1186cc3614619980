use std::time::Duration;

use tokio::time::{Instant, sleep};

use crate::contract::{JobState, PollOutcome};

use super::backoff::Backoff;
use super::error::{PollError, TransportError};
use super::transport::{HttpJobApi, JobApi};

pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";

/// Retry budget and endpoint for a [`PollingClient`].
#[derive(Debug, Clone, PartialEq)]
pub struct PollConfig {
    pub base_url: String,
    /// Status requests allowed per session.
    pub max_attempts: u32,
    /// Sleep after the first `pending` result.
    pub initial_delay: Duration,
    /// Upper bound for the doubling sleep.
    pub max_delay: Duration,
    /// Wall-clock budget for the polling loop, checked before every request.
    pub timeout: Duration,
    /// Bound on each individual HTTP request.
    pub request_timeout: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            max_attempts: 20,
            initial_delay: Duration::from_millis(1_000),
            max_delay: Duration::from_millis(15_000),
            timeout: Duration::from_millis(120_000),
            request_timeout: Duration::from_millis(5_000),
        }
    }
}

/// Per-call polling state, created fresh by every [`PollingClient::get_status`].
struct PollSession {
    attempt: u32,
    backoff: Backoff,
    started: Instant,
}

impl PollSession {
    fn start(config: &PollConfig) -> Self {
        Self {
            attempt: 0,
            backoff: Backoff::new(config.initial_delay, config.max_delay),
            started: Instant::now(),
        }
    }

    fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

/// Resets a job, then polls it until it reaches a terminal state.
pub struct PollingClient<A = HttpJobApi> {
    api: A,
    config: PollConfig,
}

impl PollingClient<HttpJobApi> {
    /// HTTP client against `config.base_url`.
    pub fn new(config: PollConfig) -> Result<Self, TransportError> {
        let api = HttpJobApi::new(&config.base_url, config.request_timeout)?;
        Ok(Self { api, config })
    }
}

impl<A: JobApi> PollingClient<A> {
    /// Client over any [`JobApi`]; `config.base_url` is ignored.
    pub fn with_api(api: A, config: PollConfig) -> Self {
        Self { api, config }
    }

    pub fn config(&self) -> &PollConfig {
        &self.config
    }

    /// Reset the job, then poll with capped exponential backoff until it
    /// completes or errors.
    ///
    /// Only a well-formed `pending` response is retried. Transport failures
    /// end the session immediately, as do an exhausted time budget and an
    /// exhausted attempt budget.
    pub async fn get_status(&self) -> Result<PollOutcome, PollError> {
        self.reset_job().await?;

        let mut session = PollSession::start(&self.config);

        while session.attempt < self.config.max_attempts {
            let elapsed = session.elapsed();
            if elapsed > self.config.timeout {
                tracing::debug!(
                    attempt = session.attempt,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "polling timed out"
                );
                return Err(PollError::TimeoutExceeded {
                    elapsed,
                    attempts: session.attempt,
                });
            }

            let result = self.fetch_status(session.attempt).await?;
            tracing::debug!(
                attempt = session.attempt,
                %result,
                elapsed_ms = session.elapsed().as_millis() as u64,
                "status check response"
            );

            if result.is_terminal() {
                return Ok(PollOutcome {
                    result,
                    attempts: session.attempt + 1,
                });
            }

            session.attempt += 1;
            let delay = session.backoff.current();
            tracing::debug!(
                next_attempt = session.attempt,
                delay_ms = delay.as_millis() as u64,
                "job pending, backing off"
            );
            self.sleep(delay).await;
            session.backoff.advance();
        }

        tracing::debug!(attempts = session.attempt, "max retry attempts reached");
        Err(PollError::MaxAttemptsExceeded {
            attempts: session.attempt,
        })
    }

    async fn reset_job(&self) -> Result<(), PollError> {
        match self.api.reset().await {
            Ok(body) => {
                tracing::debug!(message = %body.message, "server reset successfully");
                Ok(())
            }
            Err(source) => {
                tracing::debug!(error = %source, "server reset failed");
                Err(PollError::ResetFailure { source })
            }
        }
    }

    async fn fetch_status(&self, attempt: u32) -> Result<JobState, PollError> {
        match self.api.status().await {
            Ok(body) => Ok(body.result),
            Err(source) => {
                tracing::debug!(attempt, error = %source, "status check error");
                Err(PollError::StatusFetchFailure { attempt, source })
            }
        }
    }

    async fn sleep(&self, delay: Duration) {
        sleep(delay).await;
    }
}

//! Error types for the polling client.
//!
//! [`TransportError`] describes why a single request failed; [`PollError`]
//! describes why a whole polling session ended without a terminal result.
//! Both derive `Display` and `Error` through `thiserror`.

use std::time::Duration;

use thiserror::Error;

/// Failure of one request to the job simulator.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Connection, timeout or body-decoding failure inside `reqwest`.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The server answered with a non-success HTTP status.
    #[error("unexpected status {status}: {message}")]
    Status { status: u16, message: String },
}

/// Why a polling session failed.
///
/// Every variant is terminal for the session; nothing is retried internally.
#[derive(Debug, Error)]
pub enum PollError {
    /// `POST /reset` failed. No status request was issued.
    #[error("failed to reset the server: {source}")]
    ResetFailure {
        #[source]
        source: TransportError,
    },

    /// `GET /status` failed at the transport level.
    #[error("failed to GET /status from server on attempt {attempt}: {source}")]
    StatusFetchFailure {
        /// 0-based attempt index at which the request failed.
        attempt: u32,
        #[source]
        source: TransportError,
    },

    /// The session's time budget ran out before a terminal result.
    #[error("operation timed out after {}ms ({attempts} attempts)", elapsed.as_millis())]
    TimeoutExceeded { elapsed: Duration, attempts: u32 },

    /// Every attempt saw `pending`.
    #[error("max retry attempts reached ({attempts})")]
    MaxAttemptsExceeded { attempts: u32 },
}

impl PollError {
    /// Short stable name for logs and exit messages.
    pub fn kind(&self) -> &'static str {
        match self {
            PollError::ResetFailure { .. } => "reset_failure",
            PollError::StatusFetchFailure { .. } => "status_fetch_failure",
            PollError::TimeoutExceeded { .. } => "timeout_exceeded",
            PollError::MaxAttemptsExceeded { .. } => "max_attempts_exceeded",
        }
    }
}

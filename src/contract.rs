//! Wire contract shared by the job simulator and the polling client.
//!
//! Both sides speak JSON over HTTP:
//! - `POST /reset` answers with a [`ResetResponse`]
//! - `GET /status` answers with a [`StatusResponse`]

use std::fmt;

use serde::{Deserialize, Serialize};

/// Lifecycle state of the simulated job.
///
/// `Completed` and `Error` are terminal: once a job reaches either one it
/// never changes again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobState {
    Pending,
    Completed,
    Error,
}

impl JobState {
    pub fn is_terminal(self) -> bool {
        matches!(self, JobState::Completed | JobState::Error)
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobState::Pending => write!(f, "pending"),
            JobState::Completed => write!(f, "completed"),
            JobState::Error => write!(f, "error"),
        }
    }
}

/// Body of `GET /status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusResponse {
    pub result: JobState,
}

/// Body of `POST /reset`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResetResponse {
    pub message: String,
}

impl ResetResponse {
    pub fn ok() -> Self {
        Self {
            message: "Server reset successfully".to_string(),
        }
    }
}

/// Terminal outcome of a polling session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollOutcome {
    /// Terminal job state observed by the client.
    pub result: JobState,
    /// Number of status requests issued, including the one that saw `result`.
    pub attempts: u32,
}

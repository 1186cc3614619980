//! Poll a long-running job to completion with bounded exponential backoff.
//!
//! - [`simulator`]: a single-job server whose job resolves to `completed` or
//!   `error` once a delay has passed, served over HTTP by axum
//! - [`client`]: resets that job, then polls it under an attempt budget and
//!   a wall-clock budget
//! - [`contract`]: the JSON documents the two sides exchange

pub mod cli;
pub mod client;
pub mod config;
pub mod contract;
pub mod error;
pub mod logging;
pub mod simulator;
pub mod ui;

pub use client::{PollConfig, PollError, PollingClient};
pub use contract::{JobState, PollOutcome};
pub use error::JobpollError;
pub use simulator::{Simulator, SimulatorConfig};

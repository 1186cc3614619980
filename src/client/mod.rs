pub mod backoff;
pub mod error;
mod poller;
pub mod transport;

pub use backoff::Backoff;
pub use error::{PollError, TransportError};
pub use poller::{DEFAULT_BASE_URL, PollConfig, PollingClient};
pub use transport::{HttpJobApi, JobApi};

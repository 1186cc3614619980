use thiserror::Error;

/// Failures loading or validating `jobpoll.toml` and the environment.
#[derive(Debug, Error)]
pub enum JobpollError {
    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

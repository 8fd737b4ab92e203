use thiserror::Error;

/// Top-level error type for shared kgflow concerns.
#[derive(Error, Debug)]
pub enum KgflowError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

//! Error types for the kgflow-extract crate.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExtractError {
    /// Missing API key or unusable settings.
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("LLM API error (status {status}): {body}")]
    Api { status: u16, body: String },

    #[error("LLM returned no content")]
    EmptyResponse,

    /// The response was not the JSON shape we asked for.
    #[error("Failed to parse LLM response: {0}")]
    Parse(String),
}

pub type Result<T> = std::result::Result<T, ExtractError>;

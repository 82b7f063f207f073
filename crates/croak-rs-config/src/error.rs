//! Error types for settings loading and validation.

use thiserror::Error;

/// Errors returned while loading or validating settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Reading a settings file failed.
    #[error("failed to read settings: {0}")]
    ReadFailed(#[from] std::io::Error),
    /// Parsing a settings file failed.
    #[error("failed to parse settings: {0}")]
    ParseFailed(#[from] json5::Error),
    /// Converting JSON values failed.
    #[error("failed to decode settings: {0}")]
    DecodeFailed(#[from] serde_json::Error),
    /// Generic validation failure.
    #[error("invalid settings: {0}")]
    Invalid(String),
}

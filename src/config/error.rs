//! Configuration error types.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during configuration loading and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A numeric environment variable could not be parsed.
    #[error("failed to parse {name}='{value}': {reason}")]
    ParseError {
        name: &'static str,
        value: String,
        reason: String,
    },

    /// A threshold is outside `[0, 1]`.
    #[error("{name} must be between 0.0 and 1.0, got {value}")]
    ThresholdOutOfRange { name: &'static str, value: f32 },

    /// Display threshold is above 100.
    #[error("display threshold must be between 0 and 100, got {value}")]
    PercentOutOfRange { value: u8 },

    /// Weights are negative or both zero.
    #[error("invalid scoring weights: semantic={semantic}, lexical={lexical}")]
    InvalidWeights { semantic: f32, lexical: f32 },

    /// A capacity or timeout was configured as zero.
    #[error("{name} must be greater than zero")]
    ZeroValue { name: &'static str },

    /// Specified path does not exist on the filesystem.
    #[error("path does not exist: {path}")]
    PathNotFound { path: PathBuf },

    /// Path exists but is not a directory (when a directory was expected).
    #[error("path is not a directory: {path}")]
    NotADirectory { path: PathBuf },

    /// Endpoint URL does not look like an http(s) URL.
    #[error("invalid endpoint URL for {name}: '{value}'")]
    InvalidUrl { name: &'static str, value: String },
}

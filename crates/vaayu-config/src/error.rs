//! Error types for config loading and lookup.

use thiserror::Error;

/// Errors returned while loading, validating, or querying config.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Reading an rc file failed.
    #[error("failed to read config: {0}")]
    ReadFailed(#[from] std::io::Error),
    /// Parsing a config document failed.
    #[error("failed to parse config: {0}")]
    ParseFailed(#[from] serde_yaml::Error),
    /// Serializing a namespace back to YAML failed.
    #[error("failed to encode config: {0}")]
    EncodeFailed(serde_yaml::Error),
    /// A document or namespace violated the config schema.
    #[error("invalid config at {path}: {message}")]
    Schema { path: String, message: String },
    /// A dotted-path lookup found no value and no default was supplied.
    #[error("no config value at {path}")]
    Key { path: String },
}

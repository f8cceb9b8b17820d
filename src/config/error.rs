//! Defaults file error types.

use thiserror::Error;

/// Error loading an options file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read options file: {0}")]
    ReadFile(#[from] std::io::Error),
    #[error("failed to parse options file: {0}")]
    Parse(#[from] serde_yaml::Error),
}

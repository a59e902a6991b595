//! Configuration error types.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised by configuration stores.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Store file could not be read or written.
    #[error("io error at {path}: {message}")]
    Io {
        /// File path.
        path: PathBuf,
        /// Error message.
        message: String,
    },

    /// Store file is not valid JSON.
    #[error("invalid config file {path}: {message}")]
    Json {
        /// File path.
        path: PathBuf,
        /// Error message.
        message: String,
    },

    /// Serialization failed.
    #[error("serialization error: {0}")]
    Serialize(#[from] sonic_rs::Error),

    /// No platform config directory could be determined.
    #[error("could not determine a configuration directory; set PKGDASH_CONFIG_DIR")]
    NoConfigDir,
}

impl ConfigError {
    /// Create an IO error with context.
    #[must_use]
    pub fn io(path: impl AsRef<Path>, err: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            message: err.to_string(),
        }
    }

    /// Create a JSON error with context.
    #[must_use]
    pub fn json(path: impl AsRef<Path>, err: &sonic_rs::Error) -> Self {
        Self::Json {
            path: path.as_ref().to_path_buf(),
            message: err.to_string(),
        }
    }
}

/// Result type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

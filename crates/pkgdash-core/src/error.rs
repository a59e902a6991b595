//! Error types for pkgdash core operations.

use thiserror::Error;

/// Main error type for core operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Package URL could not be parsed.
    #[error("invalid purl '{input}': {reason}")]
    InvalidPurl {
        /// The rejected input.
        input: String,
        /// Why it was rejected.
        reason: &'static str,
    },

    /// Statistics interval name not recognised.
    #[error("unknown stats interval '{0}'")]
    UnknownInterval(String),
}

impl Error {
    /// Create a purl error.
    #[must_use]
    pub fn purl(input: impl Into<String>, reason: &'static str) -> Self {
        Self::InvalidPurl {
            input: input.into(),
            reason,
        }
    }
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, Error>;

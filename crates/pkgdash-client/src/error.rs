//! Client error types.

use pkgdash_config::ConfigError;
use serde::Deserialize;
use thiserror::Error;

/// Failure of a backend request.
///
/// The display text of each variant is the user-facing message.
#[derive(Error, Debug)]
pub enum ClientError {
    /// The backend rejected the request parameters (HTTP 422).
    #[error("{location}: {message}")]
    Validation {
        /// Where the invalid input was found, e.g. `query,page`.
        location: String,
        /// Server-supplied explanation.
        message: String,
    },

    /// The backend answered with a non-2xx status other than 422.
    #[error("{status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Raw response body.
        body: String,
    },

    /// No response was received (connection failure, transport timeout).
    #[error("no response: {0}")]
    NoResponse(String),

    /// A 2xx body did not match the declared payload shape.
    #[error("invalid response body: {0}")]
    Decode(String),

    /// The configured backend address cannot be combined with the endpoint.
    #[error("invalid backend url '{url}': {message}")]
    InvalidBaseUrl {
        /// Offending address.
        url: String,
        /// Parser message.
        message: String,
    },

    /// A header override is not a valid HTTP header.
    #[error("invalid header '{name}': {message}")]
    InvalidHeader {
        /// Header name.
        name: String,
        /// Error message.
        message: String,
    },

    /// Request parameters could not be serialized.
    #[error("invalid request parameters: {0}")]
    Params(String),

    /// The backend address could not be read.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// HTTP client construction failed.
    #[error("failed to build http client: {0}")]
    Build(String),
}

impl ClientError {
    /// HTTP status of the failed response, if one was received.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Validation { .. } => Some(422),
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the backend answered but reported a failure, or never answered.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Status { .. } | Self::NoResponse(_))
    }

    /// Whether the backend rejected the request parameters.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }

    /// The string `detail` of a `{"detail": "..."}` error body, if present.
    #[must_use]
    pub fn detail(&self) -> Option<String> {
        #[derive(Deserialize)]
        struct DetailBody {
            detail: String,
        }

        let Self::Status { body, .. } = self else {
            return None;
        };
        sonic_rs::from_str::<DetailBody>(body)
            .ok()
            .map(|parsed| parsed.detail)
            .filter(|detail| !detail.trim().is_empty())
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_builder() {
            Self::Build(err.to_string())
        } else {
            Self::NoResponse(err.to_string())
        }
    }
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;

//! Backend base address, resolved at call time.

use crate::error::Result;
use crate::store::ConfigStore;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace};

/// Store key holding the backend base address.
pub const BACKEND_URL_KEY: &str = "backendUrl";

/// Environment variable providing the default backend address.
pub const BACKEND_URL_ENV: &str = "PKGDASH_BACKEND_URL";

/// Address used when neither the store nor the environment provide one.
pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8000";

/// Where the current base address came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UrlSource {
    /// Stored value.
    Store,
    /// Built-in or environment default.
    Default,
}

impl fmt::Display for UrlSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Store => write!(f, "stored"),
            Self::Default => write!(f, "default"),
        }
    }
}

/// Session configuration for the backend address.
///
/// The store is consulted on every read, so a `set_base_url` from one part
/// of the program is seen by the next request dispatched anywhere else.
#[derive(Clone)]
pub struct BackendConfig {
    store: Arc<dyn ConfigStore>,
    default_url: String,
}

impl fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendConfig")
            .field("store", &self.store)
            .field("default_url", &self.default_url)
            .finish()
    }
}

impl BackendConfig {
    /// Create a configuration whose default comes from `PKGDASH_BACKEND_URL`,
    /// falling back to [`DEFAULT_BACKEND_URL`].
    #[must_use]
    pub fn new(store: Arc<dyn ConfigStore>) -> Self {
        let default_url = std::env::var(BACKEND_URL_ENV)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BACKEND_URL.to_string());
        Self::with_default(store, default_url)
    }

    /// Create a configuration with an explicit default.
    #[must_use]
    pub fn with_default(store: Arc<dyn ConfigStore>, default_url: impl Into<String>) -> Self {
        Self {
            store,
            default_url: default_url.into(),
        }
    }

    /// Current base address.
    pub fn base_url(&self) -> Result<String> {
        Ok(self.resolve()?.0)
    }

    /// Current base address and where it came from.
    pub fn resolve(&self) -> Result<(String, UrlSource)> {
        match self.store.get(BACKEND_URL_KEY)? {
            Some(url) if !url.trim().is_empty() => {
                trace!(url = %url, "backend url from store");
                Ok((url, UrlSource::Store))
            }
            _ => Ok((self.default_url.clone(), UrlSource::Default)),
        }
    }

    /// Point subsequent requests at another backend.
    ///
    /// The value is handed to the store as-is; it is parsed when a request
    /// is built.
    pub fn set_base_url(&self, url: &str) -> Result<()> {
        debug!(url = %url, "backend url updated");
        self.store.set(BACKEND_URL_KEY, url.trim())
    }

    /// Forget the stored address and go back to the default.
    pub fn reset(&self) -> Result<()> {
        debug!("backend url reset to default");
        self.store.remove(BACKEND_URL_KEY)
    }

    /// The address used when nothing is stored.
    #[must_use]
    pub fn default_url(&self) -> &str {
        &self.default_url
    }
}

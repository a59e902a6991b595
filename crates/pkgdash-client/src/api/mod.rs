//! Typed wrappers for every backend endpoint.
//!
//! # Example
//!
//! ```no_run
//! use pkgdash_client::ApiClient;
//! use pkgdash_config::{BackendConfig, MemoryStore};
//! use std::sync::Arc;
//!
//! # async fn example() -> pkgdash_client::Result<()> {
//! let backend = BackendConfig::new(Arc::new(MemoryStore::new()));
//! let client = ApiClient::new(backend)?;
//!
//! let page = client.packages().search("^curl", &["fedora".to_string()], None, None).await?;
//! for pkg in &page.items {
//!     println!("{} {}", pkg.purl, pkg.summary.as_deref().unwrap_or(""));
//! }
//! # Ok(())
//! # }
//! ```

mod packages;
mod repositories;

pub use packages::PackagesApi;
pub use repositories::RepositoriesApi;

use crate::request::ApiClient;
use serde::Serialize;

impl ApiClient {
    /// Package endpoints.
    #[must_use]
    pub const fn packages(&self) -> PackagesApi<'_> {
        PackagesApi::new(self)
    }

    /// Repository endpoints.
    #[must_use]
    pub const fn repositories(&self) -> RepositoriesApi<'_> {
        RepositoriesApi::new(self)
    }
}

#[derive(Debug, Serialize)]
struct PageParams {
    page: Option<u64>,
    size: Option<u64>,
}

#[derive(Debug, Serialize)]
struct PurlParams<'a> {
    purl: &'a str,
}

#[derive(Debug, Serialize)]
struct UrlParams<'a> {
    url: &'a str,
}

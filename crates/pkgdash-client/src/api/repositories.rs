//! Repository endpoints (`/api/repo/*`).

use super::{PageParams, UrlParams};
use crate::error::Result;
use crate::request::ApiClient;
use pkgdash_core::{PackageSource, Page, Repository, RepositoryStats};
use serde::Serialize;

const LIST: &str = "/api/repo/list";
const SEARCH: &str = "/api/repo/search";
const INFO: &str = "/api/repo/info";
const STATS: &str = "/api/repo/stats";
const PACKAGES: &str = "/api/repo/packages";

#[derive(Debug, Serialize)]
struct SearchParams<'a> {
    q: &'a str,
    page: Option<u64>,
    size: Option<u64>,
}

/// Repository endpoints, borrowed from an [`ApiClient`].
#[derive(Debug, Clone, Copy)]
pub struct RepositoriesApi<'a> {
    client: &'a ApiClient,
}

impl<'a> RepositoriesApi<'a> {
    pub(crate) const fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// One page of all repositories.
    pub async fn list(&self, page: Option<u64>, size: Option<u64>) -> Result<Page<Repository>> {
        self.client.get(LIST, &PageParams { page, size }).await
    }

    /// Repositories whose URL matches a regular expression.
    pub async fn search(
        &self,
        regex: &str,
        page: Option<u64>,
        size: Option<u64>,
    ) -> Result<Page<Repository>> {
        let params = SearchParams {
            q: regex,
            page,
            size,
        };
        self.client.get(SEARCH, &params).await
    }

    /// Repository metadata.
    pub async fn info(&self, url: &str) -> Result<Repository> {
        self.client.get(INFO, &UrlParams { url }).await
    }

    /// Activity statistics.
    pub async fn stats(&self, url: &str) -> Result<Vec<RepositoryStats>> {
        self.client.get(STATS, &UrlParams { url }).await
    }

    /// Packages built from this repository.
    pub async fn packages(&self, url: &str) -> Result<Vec<PackageSource>> {
        self.client.get(PACKAGES, &UrlParams { url }).await
    }
}

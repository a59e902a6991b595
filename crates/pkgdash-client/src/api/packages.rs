//! Package endpoints (`/api/pkg/*`).

use super::{PageParams, PurlParams};
use crate::error::Result;
use crate::request::ApiClient;
use pkgdash_core::{Package, PackageAlert, PackageDependency, PackageSource, PackageStats, Page};
use serde::Serialize;

const LIST: &str = "/api/pkg/list";
const SEARCH: &str = "/api/pkg/search";
const INFO: &str = "/api/pkg/info";
const STATS: &str = "/api/pkg/stats";
const DEPS: &str = "/api/pkg/deps";
const TDEPS: &str = "/api/pkg/tdeps";
const RDEPS: &str = "/api/pkg/rdeps";
const ALERTS: &str = "/api/pkg/alerts";
const SOURCES: &str = "/api/pkg/sources";
const DISTROS: &str = "/api/pkg/distros";

#[derive(Debug, Serialize)]
struct SearchParams<'a> {
    q: &'a str,
    distros: &'a [String],
    page: Option<u64>,
    size: Option<u64>,
}

/// Package endpoints, borrowed from an [`ApiClient`].
#[derive(Debug, Clone, Copy)]
pub struct PackagesApi<'a> {
    client: &'a ApiClient,
}

impl<'a> PackagesApi<'a> {
    pub(crate) const fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// One page of all packages.
    pub async fn list(&self, page: Option<u64>, size: Option<u64>) -> Result<Page<Package>> {
        self.client.get(LIST, &PageParams { page, size }).await
    }

    /// Packages whose purl matches a regular expression, optionally limited
    /// to some distros.
    pub async fn search(
        &self,
        regex: &str,
        distros: &[String],
        page: Option<u64>,
        size: Option<u64>,
    ) -> Result<Page<Package>> {
        let params = SearchParams {
            q: regex,
            distros,
            page,
            size,
        };
        self.client.get(SEARCH, &params).await
    }

    /// Package metadata.
    pub async fn info(&self, purl: &str) -> Result<Package> {
        self.client.get(INFO, &PurlParams { purl }).await
    }

    /// Activity statistics of the package's source repository.
    pub async fn stats(&self, purl: &str) -> Result<Vec<PackageStats>> {
        self.client.get(STATS, &PurlParams { purl }).await
    }

    /// Direct dependencies.
    pub async fn dependencies(&self, purl: &str) -> Result<Vec<PackageDependency>> {
        self.client.get(DEPS, &PurlParams { purl }).await
    }

    /// Dependencies, followed transitively.
    pub async fn transitive_dependencies(&self, purl: &str) -> Result<Vec<PackageDependency>> {
        self.client.get(TDEPS, &PurlParams { purl }).await
    }

    /// Packages depending on this one.
    pub async fn dependents(&self, purl: &str) -> Result<Vec<PackageDependency>> {
        self.client.get(RDEPS, &PurlParams { purl }).await
    }

    /// Risk alerts.
    pub async fn alerts(&self, purl: &str) -> Result<PackageAlert> {
        self.client.get(ALERTS, &PurlParams { purl }).await
    }

    /// Source repositories the package was linked to.
    pub async fn sources(&self, purl: &str) -> Result<Vec<PackageSource>> {
        self.client.get(SOURCES, &PurlParams { purl }).await
    }

    /// Distros known to the backend.
    pub async fn distros(&self) -> Result<Vec<String>> {
        self.client.get(DISTROS, &()).await
    }
}

//! HTTP client for the pkgdash package and repository metadata service.
//!
//! This crate provides the pieces every front-end call goes through:
//!
//! - **Request pipeline** ([`ApiClient::request`]): places parameters by
//!   method (query string for GET/DELETE with repeated keys for arrays, JSON
//!   body for POST/PUT), resolves the backend address per call, and
//!   classifies responses into success, validation failure (422) and
//!   transport failure.
//!
//! - **Loading coordinator** ([`LoadingCoordinator`]): a reference-counted
//!   gate over one visible [`LoadingIndicator`].
//!
//! - **Operation wrapper** ([`fetch`]): runs a call under the coordinator and
//!   turns failures into messages for a [`MessageSink`].
//!
//! - **Endpoint catalogue** ([`api`]): typed functions for every backend
//!   endpoint.
//!
//! ## Example
//!
//! ```no_run
//! use pkgdash_client::{ApiClient, LoadingCoordinator, MessageSink, fetch};
//! use pkgdash_config::{BackendConfig, MemoryStore};
//! use std::sync::Arc;
//!
//! struct Stderr;
//! impl MessageSink for Stderr {
//!     fn error(&self, message: &str) {
//!         eprintln!("error: {message}");
//!     }
//! }
//!
//! # async fn example() -> pkgdash_client::Result<()> {
//! let client = ApiClient::new(BackendConfig::new(Arc::new(MemoryStore::new())))?;
//! let loading = LoadingCoordinator::default();
//!
//! let packages = client.packages();
//! if let Some(info) = fetch(packages.info("pkg:rpm/fedora/curl"), &Stderr, &loading).await {
//!     println!("{}", info.name);
//! }
//! # Ok(())
//! # }
//! ```

#![deny(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod api;
pub mod error;
pub mod fetch;
pub mod loading;
pub mod query;
pub mod request;

pub use api::{PackagesApi, RepositoriesApi};
pub use error::{ClientError, Result};
pub use fetch::{MessageSink, describe_error, fetch};
pub use loading::{LoadingCoordinator, LoadingGuard, LoadingIndicator, NoopIndicator};
pub use query::to_query_pairs;
pub use request::{ApiClient, ClientSettings, Method, Outcome, Request, endpoint_url};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

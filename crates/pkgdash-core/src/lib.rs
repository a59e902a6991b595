//! Core types for the pkgdash client.
//!
//! The backend owns every schema; this crate only mirrors the field shapes of
//! the JSON payloads so callers can declare what a request decodes into.
//! Payloads are passed through unmodified.

#![deny(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod purl;
pub mod types;

pub use error::{Error, Result};
pub use purl::Purl;
pub use types::{
    Location, LocationPart, Package, PackageAlert, PackageDependency, PackageSource,
    PackageStats, Page, Repository, RepositoryStats, StatsInterval, StatsRecord,
    ValidationError,
};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

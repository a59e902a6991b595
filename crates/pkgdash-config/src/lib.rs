//! Configuration for the pkgdash client.
//!
//! The only setting the client core needs is the backend base address. It is
//! kept in a [`ConfigStore`] and read through [`BackendConfig`] every time a
//! request is dispatched, so the backend can be switched at runtime.
//!
//! Resolution order for the base address:
//!   1. Value stored under `backendUrl`
//!   2. `PKGDASH_BACKEND_URL` environment variable
//!   3. `http://localhost:8000`
//!
//! # Quick Start
//!
//! ```no_run
//! use pkgdash_config::{BackendConfig, FileStore};
//! use std::sync::Arc;
//!
//! let store = FileStore::default_location().expect("no config dir");
//! let config = BackendConfig::new(Arc::new(store));
//! config.set_base_url("https://pkgdash.example.org").expect("write failed");
//! println!("backend: {}", config.base_url().expect("read failed"));
//! ```

#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod backend;
pub mod error;
pub mod store;

pub use backend::{
    BACKEND_URL_ENV, BACKEND_URL_KEY, BackendConfig, DEFAULT_BACKEND_URL, UrlSource,
};
pub use error::{ConfigError, Result};
pub use store::{
    CONFIG_DIR_ENV, CONFIG_FILE_NAME, ConfigStore, FileStore, MemoryStore, default_config_dir,
};

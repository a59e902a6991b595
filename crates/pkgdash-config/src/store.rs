//! Key-value stores for persisted settings.

use crate::error::{ConfigError, Result};
use directories::ProjectDirs;
use parking_lot::{Mutex, RwLock};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// Environment variable overriding the config directory.
pub const CONFIG_DIR_ENV: &str = "PKGDASH_CONFIG_DIR";

/// File name of the persisted settings.
pub const CONFIG_FILE_NAME: &str = "config.json";

/// String key-value store consulted for persisted settings.
pub trait ConfigStore: Send + Sync + fmt::Debug {
    /// Read a value.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write a value.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove a value. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<()>;
}

/// Volatile store, used for one-off overrides and in tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: RwLock<BTreeMap<String, String>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding a single value.
    #[must_use]
    pub fn with_value(key: impl Into<String>, value: impl Into<String>) -> Self {
        let store = Self::new();
        store.values.write().insert(key.into(), value.into());
        store
    }
}

impl ConfigStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.read().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.values.write().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.values.write().remove(key);
        Ok(())
    }
}

/// JSON object on disk, re-read on every access so edits made by another
/// process are picked up without a restart.
pub struct FileStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl fmt::Debug for FileStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileStore").field("path", &self.path).finish()
    }
}

impl FileStore {
    /// Create a store backed by the given file. The file is created lazily.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Store in the default location: `$PKGDASH_CONFIG_DIR/config.json`, or
    /// the platform config directory.
    pub fn default_location() -> Result<Self> {
        Ok(Self::new(default_config_dir()?.join(CONFIG_FILE_NAME)))
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<BTreeMap<String, String>> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                trace!(path = %self.path.display(), "config file missing");
                return Ok(BTreeMap::new());
            }
            Err(e) => return Err(ConfigError::io(&self.path, e)),
        };
        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        sonic_rs::from_str(&content).map_err(|e| ConfigError::json(&self.path, &e))
    }

    fn save(&self, values: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::io(parent, e))?;
        }
        let content = sonic_rs::to_string_pretty(values)?;
        std::fs::write(&self.path, content).map_err(|e| ConfigError::io(&self.path, e))?;
        debug!(path = %self.path.display(), "config saved");
        Ok(())
    }

    fn update(&self, f: impl FnOnce(&mut BTreeMap<String, String>)) -> Result<()> {
        let _guard = self.write_lock.lock();
        let mut values = self.load()?;
        f(&mut values);
        self.save(&values)
    }
}

impl ConfigStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.load()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.update(|values| {
            values.insert(key.to_string(), value.to_string());
        })
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.update(|values| {
            values.remove(key);
        })
    }
}

/// Resolve the configuration directory.
pub fn default_config_dir() -> Result<PathBuf> {
    if let Some(dir) = std::env::var_os(CONFIG_DIR_ENV).filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    ProjectDirs::from("org", "pkgdash", "pkgdash")
        .map(|dirs| dirs.config_dir().to_path_buf())
        .ok_or(ConfigError::NoConfigDir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn memory_store_roundtrip() {
        let store = MemoryStore::new();
        assert_eq!(store.get("backendUrl").unwrap(), None);

        store.set("backendUrl", "http://a").unwrap();
        assert_eq!(store.get("backendUrl").unwrap().as_deref(), Some("http://a"));

        store.remove("backendUrl").unwrap();
        assert_eq!(store.get("backendUrl").unwrap(), None);
    }

    #[test]
    fn file_store_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path().join("config.json"));
        assert_eq!(store.get("backendUrl").unwrap(), None);
    }

    #[test]
    fn file_store_persists_across_instances() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.json");

        FileStore::new(&path).set("backendUrl", "http://b").unwrap();

        let reopened = FileStore::new(&path);
        assert_eq!(reopened.get("backendUrl").unwrap().as_deref(), Some("http://b"));
        assert!(std::fs::read_to_string(&path).unwrap().contains("http://b"));
    }

    #[test]
    fn file_store_keeps_other_keys() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path().join("config.json"));
        store.set("theme", "dark").unwrap();
        store.set("backendUrl", "http://c").unwrap();
        store.remove("backendUrl").unwrap();

        assert_eq!(store.get("theme").unwrap().as_deref(), Some("dark"));
        assert_eq!(store.get("backendUrl").unwrap(), None);
    }

    #[test]
    fn file_store_rejects_garbage() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{not json").unwrap();

        let err = FileStore::new(&path).get("backendUrl").unwrap_err();
        assert!(matches!(err, ConfigError::Json { .. }));
    }
}

//! Persistent "banner dismissed" flag.
//!
//! The landing page shows a promotional banner until the visitor closes it.
//! The flag lives in a small key-value store so it survives restarts.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;

use thiserror::Error;

/// Storage key for the dismissal flag.
pub const BANNER_DISMISSED_KEY: &str = "banner-dismissed";

/// Errors that can occur in a [`KeyValueStore`].
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("storage file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Minimal string key-value storage.
pub trait KeyValueStore {
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// Process-local store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self
            .entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .get(key)
            .cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Store backed by a JSON object on disk. A missing file is an empty store.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn load(&self) -> Result<HashMap<String, String>, StorageError> {
        match fs::read_to_string(&self.path) {
            Ok(raw) => Ok(serde_json::from_str(&raw)?),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(HashMap::new()),
            Err(e) => Err(e.into()),
        }
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.load()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.load()?;
        entries.insert(key.to_string(), value.to_string());
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(&entries)?)?;
        Ok(())
    }
}

/// Reads and writes the banner flag.
#[derive(Debug)]
pub struct BannerDismissal<S> {
    store: S,
}

impl<S: KeyValueStore> BannerDismissal<S> {
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// Whether the banner was dismissed. Any non-empty stored value counts;
    /// unreadable storage counts as not dismissed.
    #[must_use]
    pub fn is_dismissed(&self) -> bool {
        match self.store.get(BANNER_DISMISSED_KEY) {
            Ok(value) => value.is_some_and(|v| !v.is_empty()),
            Err(e) => {
                tracing::warn!(error = %e, "Could not read banner flag");
                false
            }
        }
    }

    /// Record that the banner was dismissed.
    ///
    /// # Errors
    ///
    /// Returns an error if the flag cannot be persisted.
    pub fn dismiss(&self) -> Result<(), StorageError> {
        self.store.set(BANNER_DISMISSED_KEY, "true")
    }
}

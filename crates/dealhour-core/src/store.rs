//! Key-addressed document storage with whole-document replace semantics.
//!
//! [`FileStore`] is the production backend: every write lands in
//! `<key>.tmp` first and is renamed over the canonical file, so a reader never
//! observes a half-written document. [`MemoryStore`] backs tests.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

pub const TOKEN_KEY: &str = "ebay_token.json";
pub const CATEGORIES_KEY: &str = "categories.json";
pub const QUEUE_KEY: &str = "daily_deals.json";
pub const SETTINGS_KEY: &str = "settings.json";
pub const AFFILIATE_LOG_KEY: &str = "affiliate_links.log";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error in document {key}: {source}")]
    Json {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Storage for small UTF-8 documents addressed by key.
pub trait DocumentStore: Send + Sync {
    /// Returns `Ok(None)` when no document exists under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the document exists but cannot be read.
    fn read(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Atomically replaces the whole document under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the write or rename fails.
    fn replace(&self, key: &str, contents: &str) -> Result<(), StoreError>;
}

/// Read a JSON document and decode it.
///
/// # Errors
///
/// Returns [`StoreError`] on read failure or if the document is not valid JSON for `T`.
pub fn load_json<T: DeserializeOwned>(
    store: &dyn DocumentStore,
    key: &str,
) -> Result<Option<T>, StoreError> {
    let Some(raw) = store.read(key)? else {
        return Ok(None);
    };
    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|source| StoreError::Json {
            key: key.to_string(),
            source,
        })
}

/// Encode `value` as pretty JSON and replace the document under `key`.
///
/// # Errors
///
/// Returns [`StoreError`] if encoding or the write fails.
pub fn save_json<T: Serialize + ?Sized>(
    store: &dyn DocumentStore,
    key: &str,
    value: &T,
) -> Result<(), StoreError> {
    let raw = serde_json::to_string_pretty(value).map_err(|source| StoreError::Json {
        key: key.to_string(),
        source,
    })?;
    store.replace(key, &raw)
}

/// Documents stored as files under one directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }
}

impl DocumentStore for FileStore {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.path_for(key);
        match std::fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StoreError::Io {
                path: path.display().to_string(),
                source,
            }),
        }
    }

    fn replace(&self, key: &str, contents: &str) -> Result<(), StoreError> {
        std::fs::create_dir_all(&self.root).map_err(|source| StoreError::Io {
            path: self.root.display().to_string(),
            source,
        })?;

        let path = self.path_for(key);
        let tmp_path = self.root.join(format!("{key}.tmp"));

        let written =
            std::fs::write(&tmp_path, contents).and_then(|()| std::fs::rename(&tmp_path, &path));

        if let Err(source) = written {
            if tmp_path.exists() {
                if let Err(e) = std::fs::remove_file(&tmp_path) {
                    tracing::warn!(
                        path = %tmp_path.display(),
                        error = %e,
                        "failed to remove temporary file after write error"
                    );
                }
            }
            return Err(StoreError::Io {
                path: path.display().to_string(),
                source,
            });
        }

        Ok(())
    }
}

/// In-process store for tests and dry runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    docs: Mutex<HashMap<String, String>>,
    reject_writes: bool,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose every `replace` fails, for exercising write-failure paths.
    #[must_use]
    pub fn rejecting_writes() -> Self {
        Self {
            docs: Mutex::default(),
            reject_writes: true,
        }
    }

    /// Seed a document directly, bypassing `reject_writes`.
    pub fn insert(&self, key: &str, contents: &str) {
        self.docs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), contents.to_string());
    }
}

impl DocumentStore for MemoryStore {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self
            .docs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned())
    }

    fn replace(&self, key: &str, contents: &str) -> Result<(), StoreError> {
        if self.reject_writes {
            return Err(StoreError::Io {
                path: key.to_string(),
                source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only store"),
            });
        }
        self.insert(key, contents);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_store_missing_document_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        assert!(store.read("absent.json").unwrap().is_none());
    }

    #[test]
    fn file_store_replace_creates_dir_and_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("nested").join("data");
        let store = FileStore::new(&root);

        store.replace("doc.json", "[1,2]").unwrap();
        store.replace("doc.json", "[3]").unwrap();

        assert_eq!(store.read("doc.json").unwrap().as_deref(), Some("[3]"));
        assert!(!root.join("doc.json.tmp").exists());
    }

    #[test]
    fn file_store_failed_rename_cleans_up_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        // A directory at the canonical path makes the rename fail.
        std::fs::create_dir(dir.path().join("blocked.json")).unwrap();
        std::fs::write(dir.path().join("blocked.json").join("child"), "x").unwrap();

        let result = store.replace("blocked.json", "{}");

        assert!(matches!(result, Err(StoreError::Io { .. })));
        assert!(!dir.path().join("blocked.json.tmp").exists());
    }

    #[test]
    fn load_json_reports_malformed_document() {
        let store = MemoryStore::new();
        store.insert("bad.json", "{not json");
        let result = load_json::<Vec<u32>>(&store, "bad.json");
        assert!(matches!(result, Err(StoreError::Json { ref key, .. }) if key == "bad.json"));
    }

    #[test]
    fn save_then_load_json() {
        let store = MemoryStore::new();
        save_json(&store, "nums.json", &vec![1u32, 2, 3]).unwrap();
        let nums: Vec<u32> = load_json(&store, "nums.json").unwrap().unwrap();
        assert_eq!(nums, vec![1, 2, 3]);
    }

    #[test]
    fn rejecting_store_fails_writes_but_allows_seeding() {
        let store = MemoryStore::rejecting_writes();
        store.insert("seeded", "x");
        assert!(store.replace("seeded", "y").is_err());
        assert_eq!(store.read("seeded").unwrap().as_deref(), Some("x"));
    }
}

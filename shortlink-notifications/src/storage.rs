//! Synchronous key-value storage backends.
//!
//! [`KeyValueStore`] models a browser-style local storage: string values under
//! string keys, with writes that may be rejected once a quota is reached.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use shortlink_core::utils::fs as console_fs;
use shortlink_core::CoreError;
use tracing::debug;

use crate::errors::StorageError;

pub trait KeyValueStore: Send + Sync {
    /// Returns the stored value, or `None` when the key is absent.
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Deletes `key`. Removing an absent key is not an error.
    fn remove_item(&self, key: &str) -> Result<(), StorageError>;
}

fn check_quota(key: &str, used_by_others: usize, value: &str, quota: Option<usize>) -> Result<(), StorageError> {
    if let Some(quota_bytes) = quota {
        let attempted_bytes = used_by_others + key.len() + value.len();
        if attempted_bytes > quota_bytes {
            return Err(StorageError::QuotaExceeded {
                key: key.to_string(),
                attempted_bytes,
                quota_bytes,
            });
        }
    }
    Ok(())
}

/// Process-local storage. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryKeyValueStore {
    entries: Mutex<HashMap<String, String>>,
    quota_bytes: Option<usize>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Default::default()
    }

    /// Rejects writes once keys plus values would exceed `quota_bytes`.
    pub fn with_quota(quota_bytes: usize) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            quota_bytes: Some(quota_bytes),
        }
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, String>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.entries();
        let used_by_others: usize = entries
            .iter()
            .filter(|(k, _)| k.as_str() != key)
            .map(|(k, v)| k.len() + v.len())
            .sum();
        check_quota(key, used_by_others, value, self.quota_bytes)?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        self.entries().remove(key);
        Ok(())
    }
}

const VALUE_EXTENSION: &str = "json";

/// Stores each key as `<root>/<key>.json`.
///
/// Writes go to a temporary sibling first and are renamed into place, so a
/// reader never observes a half-written value.
#[derive(Debug)]
pub struct FileKeyValueStore {
    root: PathBuf,
    quota_bytes: Option<usize>,
    write_lock: Mutex<()>,
}

impl FileKeyValueStore {
    /// Opens (and creates if needed) the storage directory.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, CoreError> {
        let root = root.into();
        console_fs::ensure_dir_exists(&root)?;
        Ok(Self {
            root,
            quota_bytes: None,
            write_lock: Mutex::new(()),
        })
    }

    pub fn with_quota(mut self, quota_bytes: Option<usize>) -> Self {
        self.quota_bytes = quota_bytes;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        let valid = !key.is_empty()
            && !key.starts_with('.')
            && key.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
        if !valid {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.root.join(format!("{}.{}", key, VALUE_EXTENSION)))
    }

    fn bytes_used_by_others(&self, key: &str) -> Result<usize, StorageError> {
        let entries = fs::read_dir(&self.root).map_err(|e| StorageError::Backend {
            key: key.to_string(),
            source: CoreError::Filesystem {
                message: "Failed to list storage directory".to_string(),
                path: self.root.clone(),
                source: e,
            },
        })?;

        let own_file = format!("{}.{}", key, VALUE_EXTENSION);
        let mut total: usize = 0;
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(VALUE_EXTENSION) {
                continue;
            }
            let file_name = entry.file_name().to_string_lossy().into_owned();
            if file_name == own_file {
                continue;
            }
            let stem_len = file_name.len() - VALUE_EXTENSION.len() - 1;
            let value_len = entry
                .metadata()
                .map(|m| usize::try_from(m.len()).unwrap_or(usize::MAX))
                .unwrap_or(0);
            total = total.saturating_add(stem_len).saturating_add(value_len);
        }
        Ok(total)
    }
}

impl KeyValueStore for FileKeyValueStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key)?;
        match console_fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(StorageError::Backend { key: key.to_string(), source: e }),
        }
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);

        if self.quota_bytes.is_some() {
            let used_by_others = self.bytes_used_by_others(key)?;
            check_quota(key, used_by_others, value, self.quota_bytes)?;
        }

        let staging = path.with_extension(format!("{}.tmp", VALUE_EXTENSION));
        console_fs::write_string_to_file(&staging, value)
            .map_err(|e| StorageError::Backend { key: key.to_string(), source: e })?;
        fs::rename(&staging, &path).map_err(|e| StorageError::Backend {
            key: key.to_string(),
            source: CoreError::Filesystem {
                message: "Failed to move staged value into place".to_string(),
                path: path.clone(),
                source: e,
            },
        })?;
        debug!(key, bytes = value.len(), path = %path.display(), "Stored value");
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::Backend {
                key: key.to_string(),
                source: CoreError::Filesystem {
                    message: "Failed to remove stored value".to_string(),
                    path,
                    source: e,
                },
            }),
        }
    }
}

use gramstay_core::{StorageBackend, StoreError};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::app_config::StorageConfig;

const EXTENSION: &str = "json";

/// Durable storage: one file per key under a root directory.
///
/// Writes go to a sibling temp file first and are renamed into place, so a
/// reader sees either the previous snapshot or the new one.
#[derive(Debug, Clone)]
pub struct FileStorage {
    root: PathBuf,
    quota_bytes: Option<u64>,
}

impl FileStorage {
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        debug!("File storage opened at {}", root.display());
        Ok(Self {
            root,
            quota_bytes: None,
        })
    }

    pub fn from_config(config: &StorageConfig) -> Result<Self, StoreError> {
        let storage = Self::open(&config.dir)?;
        Ok(match config.quota_bytes {
            Some(quota) => storage.with_quota(quota),
            None => storage,
        })
    }

    pub fn with_quota(mut self, quota_bytes: u64) -> Self {
        self.quota_bytes = Some(quota_bytes);
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Keys become file names; anything outside `[A-Za-z0-9_-]` is percent-encoded.
    fn path_for(&self, key: &str) -> PathBuf {
        let mut name = String::with_capacity(key.len());
        for byte in key.bytes() {
            if byte.is_ascii_alphanumeric() || byte == b'-' || byte == b'_' {
                name.push(byte as char);
            } else {
                name.push_str(&format!("%{:02X}", byte));
            }
        }
        self.root.join(format!("{}.{}", name, EXTENSION))
    }

    fn used_bytes_excluding(&self, target: &Path) -> Result<u64, StoreError> {
        let mut total = 0;
        for entry in fs::read_dir(&self.root)? {
            let path = entry?.path();
            if path == target || path.extension().and_then(|e| e.to_str()) != Some(EXTENSION) {
                continue;
            }
            total += fs::metadata(&path)?.len();
        }
        Ok(total)
    }
}

impl StorageBackend for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let path = self.path_for(key);

        if let Some(quota) = self.quota_bytes {
            let needed = self.used_bytes_excluding(&path)? + value.len() as u64;
            if needed > quota {
                return Err(StoreError::QuotaExceeded { needed, quota });
            }
        }

        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_values_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();

        let storage = FileStorage::open(dir.path()).unwrap();
        storage.set("gramstay:savedItems", r#"{"listings":["manali-valley"]}"#).unwrap();

        let reopened = FileStorage::open(dir.path()).unwrap();
        assert_eq!(
            reopened.get("gramstay:savedItems").unwrap().as_deref(),
            Some(r#"{"listings":["manali-valley"]}"#)
        );
        assert!(dir.path().join("gramstay%3AsavedItems.json").exists());
    }

    #[test]
    fn test_missing_key_and_remove_are_quiet() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::open(dir.path()).unwrap();

        assert_eq!(storage.get("never-written").unwrap(), None);
        storage.remove("never-written").unwrap();
    }

    #[test]
    fn test_quota_rejects_and_keeps_previous_file() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::open(dir.path()).unwrap().with_quota(16);

        storage.set("reviews", "[]").unwrap();
        let err = storage.set("reviews", &"x".repeat(17)).unwrap_err();

        assert!(matches!(err, StoreError::QuotaExceeded { needed: 17, quota: 16 }));
        assert_eq!(storage.get("reviews").unwrap().as_deref(), Some("[]"));
    }
}

use gramstay_core::{StorageBackend, StoreError};
use std::collections::HashMap;
use std::sync::RwLock;

/// Process-local storage. Nothing survives the process.
///
/// `with_quota` and `unavailable` reproduce the two ways browser storage
/// refuses writes, so failure handling can be exercised without a disk.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: RwLock<HashMap<String, String>>,
    quota_bytes: Option<u64>,
    unavailable: bool,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject writes once the summed value sizes would pass `quota_bytes`
    pub fn with_quota(quota_bytes: u64) -> Self {
        Self {
            quota_bytes: Some(quota_bytes),
            ..Self::default()
        }
    }

    /// Every call fails, like storage disabled by the host
    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::default()
        }
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|entries| entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn ensure_available(&self) -> Result<(), StoreError> {
        if self.unavailable {
            return Err(StoreError::Unavailable("storage disabled".to_string()));
        }
        Ok(())
    }
}

fn poisoned() -> StoreError {
    StoreError::Unavailable("storage lock poisoned".to_string())
}

impl StorageBackend for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.ensure_available()?;
        let entries = self.entries.read().map_err(|_| poisoned())?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.ensure_available()?;
        let mut entries = self.entries.write().map_err(|_| poisoned())?;

        if let Some(quota) = self.quota_bytes {
            let others: u64 = entries
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(_, v)| v.len() as u64)
                .sum();
            let needed = others + value.len() as u64;
            if needed > quota {
                return Err(StoreError::QuotaExceeded { needed, quota });
            }
        }

        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.ensure_available()?;
        let mut entries = self.entries.write().map_err(|_| poisoned())?;
        entries.remove(key);
        Ok(())
    }
}

use gramstay_core::{Snapshot, StorageBackend};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::memory_store::MemoryStorage;

/// Typed, best-effort view over a `StorageBackend`.
///
/// Reads never fail: a missing, unreadable, unparsable or invalid value
/// yields the caller's default. Writes never fail either; a rejected write
/// is logged and the caller keeps its in-memory state.
#[derive(Clone)]
pub struct PersistentMirror {
    backend: Arc<dyn StorageBackend>,
    namespace: String,
}

impl PersistentMirror {
    pub fn new(backend: Arc<dyn StorageBackend>, namespace: impl Into<String>) -> Self {
        Self {
            backend,
            namespace: namespace.into(),
        }
    }

    /// Ephemeral mirror over a fresh `MemoryStorage`
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStorage::new()), "gramstay")
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    fn scoped(&self, key: &str) -> String {
        if self.namespace.is_empty() {
            key.to_string()
        } else {
            format!("{}:{}", self.namespace, key)
        }
    }

    pub fn load<T: Snapshot>(&self, key: &str, default: T) -> T {
        let scoped = self.scoped(key);

        let raw = match self.backend.get(&scoped) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!("No stored value for {}, using default", scoped);
                return default;
            }
            Err(e) => {
                warn!("Failed to read {}: {}", scoped, e);
                return default;
            }
        };

        let value: T = match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(e) => {
                warn!("Discarding unparsable value under {}: {}", scoped, e);
                return default;
            }
        };

        if let Err(e) = value.check() {
            warn!("Discarding invalid value under {}: {}", scoped, e);
            return default;
        }

        value
    }

    pub fn load_or_default<T: Snapshot + Default>(&self, key: &str) -> T {
        self.load(key, T::default())
    }

    /// Returns whether the value reached storage.
    pub fn save<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> bool {
        let scoped = self.scoped(key);

        let json = match serde_json::to_string(value) {
            Ok(json) => json,
            Err(e) => {
                warn!("Failed to serialize {}: {}", scoped, e);
                return false;
            }
        };

        match self.backend.set(&scoped, &json) {
            Ok(()) => {
                debug!("Persisted {} ({} bytes)", scoped, json.len());
                true
            }
            Err(e) => {
                warn!("Failed to persist {}: {}", scoped, e);
                false
            }
        }
    }

    pub fn clear(&self, key: &str) -> bool {
        let scoped = self.scoped(key);
        match self.backend.remove(&scoped) {
            Ok(()) => true,
            Err(e) => {
                warn!("Failed to clear {}: {}", scoped, e);
                false
            }
        }
    }
}

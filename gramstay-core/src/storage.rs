use serde::{de::DeserializeOwned, Serialize};
use validator::Validate;

use crate::{validation, CoreResult};

/// Durable string key-value storage the persistent mirror writes through.
///
/// Calls are synchronous; implementations must not retry internally.
pub trait StorageBackend: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("Storage quota exceeded: {needed} bytes requested, {quota} allowed")]
    QuotaExceeded {
        needed: u64,
        quota: u64,
    },
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// A container's persisted collection, checked at the deserialization boundary.
pub trait Snapshot: Serialize + DeserializeOwned {
    /// Reject shapes that parsed but break record invariants
    fn check(&self) -> CoreResult<()>;
}

impl<T> Snapshot for Vec<T>
where
    T: Validate + Serialize + DeserializeOwned,
{
    fn check(&self) -> CoreResult<()> {
        self.iter().try_for_each(validation::check)
    }
}

pub mod clock;
pub mod storage;
pub mod validation;

pub use clock::{Clock, FixedClock, SystemClock};
pub use storage::{Snapshot, StorageBackend, StoreError};

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Validation failed: {0}")]
    ValidationError(String),
    #[error("Invalid state transition from {from} to {to}")]
    InvalidTransition {
        from: String,
        to: String,
    },
    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),
}

impl CoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, CoreError::NotFound(_))
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, CoreError::ValidationError(_))
    }
}

pub type CoreResult<T> = Result<T, CoreError>;

/// Fresh record identifier (UUID v4, hyphenated)
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

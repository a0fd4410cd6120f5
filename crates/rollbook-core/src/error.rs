//! Error types for the record store and its collaborators.
//!
//! Every failure the store can report is a distinct variant so callers can
//! react to each one (prompt for a different student ID, ask the user to
//! free space, reject an import) without string matching.

use thiserror::Error;

/// Errors returned by [`RecordStore`](crate::store::RecordStore) operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Another stored record already uses this student ID.
    #[error("student ID already exists: {record_id}")]
    DuplicateKey { record_id: String },

    /// No record has this internal ID.
    #[error("record not found: {internal_id}")]
    NotFound { internal_id: String },

    /// The import payload is not an array of records.
    #[error("invalid import payload: {0}")]
    ImportFormat(String),

    /// A record field would break a collection invariant.
    #[error("invalid {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },

    /// The durable write was refused for capacity. The in-memory mutation
    /// has already been applied and is not rolled back.
    #[error("storage quota exceeded: need {needed} bytes, capacity is {capacity} bytes")]
    PersistenceQuotaExceeded { needed: u64, capacity: u64 },

    /// Any other persistence failure.
    #[error("storage error: {0}")]
    Storage(String),

    /// The persisted collection could not be decoded at startup.
    #[error("stored collection is corrupt: {0}")]
    Corrupt(String),
}

impl StoreError {
    /// Returns `true` if the in-memory state changed even though the call failed.
    pub fn is_persistence_failure(&self) -> bool {
        matches!(
            self,
            StoreError::PersistenceQuotaExceeded { .. } | StoreError::Storage(_)
        )
    }
}

impl From<StorageError> for StoreError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::QuotaExceeded { needed, capacity } => {
                StoreError::PersistenceQuotaExceeded { needed, capacity }
            }
            other => StoreError::Storage(other.to_string()),
        }
    }
}

/// Convenience alias for store results.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors raised by a [`KeyValueStore`](crate::storage::KeyValueStore) backend.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Writing the value would push the backend past its capacity.
    #[error("quota exceeded: need {needed} bytes, capacity is {capacity} bytes")]
    QuotaExceeded { needed: u64, capacity: u64 },

    /// Filesystem failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while building report views.
#[derive(Debug, Error, PartialEq)]
pub enum ReportError {
    /// Bucket boundaries are too few, unordered, or not finite.
    #[error("invalid bucket boundaries: {0}")]
    InvalidBuckets(String),
}

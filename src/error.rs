//! Error types for satchel.

use thiserror::Error;

/// Errors raised by store construction and keyed store operations.
#[derive(Error, Debug)]
pub enum StoreError {
    // ============ Configuration Errors ============
    #[error("Duplicate store key: {0}")]
    DuplicateKey(String),

    #[error("Invalid initial value at key {key}: {reason}")]
    InvalidValue { key: String, reason: String },

    #[error("Configuration error: {0}")]
    Config(#[from] serde_json::Error),

    // ============ Operation Errors ============
    #[error("Unknown store key: {0}")]
    UnknownKey(String),
}

impl StoreError {
    pub(crate) fn unknown_key(key: &impl std::fmt::Debug) -> Self {
        StoreError::UnknownKey(format!("{key:?}"))
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Errors reported by a [`Synchronizer`](crate::sync::Synchronizer).
///
/// The store never surfaces these to callers. They select a recovery path
/// during initialization and are logged.
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Snapshot unavailable: {0}")]
    Unavailable(String),

    #[error("No external value for key {0}")]
    Missing(String),

    #[error("Storage error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Backend error: {0}")]
    Backend(String),

    #[error("Key cannot be stored as a file name: {0}")]
    InvalidKey(String),
}

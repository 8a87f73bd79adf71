//! Error types for the storage layer

use std::fmt;
use thiserror::Error;

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Storage error types
#[derive(Error, Debug)]
pub enum StorageError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization failed
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Persisted state was written by a newer schema
    #[error("Unsupported persisted state version {0}")]
    UnsupportedVersion(u32),

    /// Storage backend unavailable
    #[error("Backend unavailable: {0}")]
    Unavailable(String),

    /// Key cannot be mapped onto the backend
    #[error("Invalid key: {0:?}")]
    InvalidKey(String),

    /// The store refused the write because it is full
    #[error("Storage quota exceeded: {0}")]
    QuotaExceeded(String),
}

impl StorageError {
    /// Create a serialization error
    pub fn serialization<E: fmt::Display>(err: E) -> Self {
        Self::Serialization(err.to_string())
    }

    /// Create an unavailable error
    pub fn unavailable<E: fmt::Display>(msg: E) -> Self {
        Self::Unavailable(msg.to_string())
    }

    /// Create a quota error
    pub fn quota_exceeded<E: fmt::Display>(msg: E) -> Self {
        Self::QuotaExceeded(msg.to_string())
    }

    /// Whether the failure concerns reading or writing the medium rather than the data
    pub fn is_medium_failure(&self) -> bool {
        matches!(
            self,
            Self::Io(_) | Self::Unavailable(_) | Self::QuotaExceeded(_)
        )
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        Self::serialization(err)
    }
}

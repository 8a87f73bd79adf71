//! Core trait definitions for the storage layer

use async_trait::async_trait;

use super::error::StorageResult;

/// Durable string key-value store
///
/// Values are opaque text; each `set` overwrites the whole value.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read a value, `None` if the key was never written or was removed
    async fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// Write a value, replacing any previous one
    async fn set(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Remove a key. Removing a missing key is not an error.
    async fn remove(&self, key: &str) -> StorageResult<()>;
}

//! In-memory key-value backend for testing

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::storage::{
    error::{StorageError, StorageResult},
    traits::KeyValueStore,
};

/// In-memory store. Clones share the same contents.
#[derive(Debug, Clone, Default)]
pub struct MemoryKeyValueStore {
    values: Arc<Mutex<HashMap<String, String>>>,
    fail_writes: Arc<AtomicBool>,
    fail_removes: Arc<AtomicBool>,
    writes: Arc<AtomicUsize>,
}

impl MemoryKeyValueStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    fn values(&self) -> MutexGuard<'_, HashMap<String, String>> {
        self.values.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Make every following `set` fail as if the quota were exhausted
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Make every following `remove` fail as if the medium were read-only
    pub fn set_fail_removes(&self, fail: bool) {
        self.fail_removes.store(fail, Ordering::SeqCst);
    }

    /// Number of successful writes so far
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Current raw value of `key`
    pub fn raw(&self, key: &str) -> Option<String> {
        self.values().get(key).cloned()
    }

    /// Put a raw value in place, bypassing write accounting
    pub fn seed(&self, key: &str, value: &str) {
        self.values()
            .insert(key.to_string(), value.to_string());
    }

    /// All keys currently present, sorted
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.values().keys().cloned().collect();
        keys.sort();
        keys
    }
}

#[async_trait]
impl KeyValueStore for MemoryKeyValueStore {
    async fn get(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.raw(key))
    }

    async fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::quota_exceeded(format!(
                "cannot store {} bytes under {key:?}",
                value.len()
            )));
        }
        self.seed(key, value);
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn remove(&self, key: &str) -> StorageResult<()> {
        if self.fail_removes.load(Ordering::SeqCst) {
            return Err(StorageError::unavailable(format!(
                "cannot remove {key:?}: read-only"
            )));
        }
        self.values().remove(key);
        Ok(())
    }
}

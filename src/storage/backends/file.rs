//! File-based key-value backend
//!
//! Each key is stored as `<base_dir>/<key>.json`. Writes go to a temp file
//! first and are renamed into place, so a crash mid-write leaves the previous
//! value intact.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::trace;

use crate::storage::{
    error::{StorageError, StorageResult},
    traits::KeyValueStore,
};

/// File-based key-value store
#[derive(Debug, Clone)]
pub struct FileKeyValueStore {
    base_dir: PathBuf,
}

impl FileKeyValueStore {
    /// Create a store rooted at `base_dir`. The directory is created on first write.
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Get the file holding `key`
    pub fn key_path(&self, key: &str) -> StorageResult<PathBuf> {
        let valid = !key.is_empty()
            && !key.starts_with('.')
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
        if !valid {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.base_dir.join(format!("{key}.json")))
    }
}

#[async_trait]
impl KeyValueStore for FileKeyValueStore {
    async fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let path = self.key_path(key)?;

        match fs::read_to_string(&path).await {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::Io(e)),
        }
    }

    async fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        let path = self.key_path(key)?;
        fs::create_dir_all(&self.base_dir).await?;

        // Atomic write
        let temp_path = path.with_extension("json.tmp");
        fs::write(&temp_path, value).await?;
        fs::rename(&temp_path, &path).await?;

        trace!("Wrote {} bytes to {}", value.len(), path.display());
        Ok(())
    }

    async fn remove(&self, key: &str) -> StorageResult<()> {
        let path = self.key_path(key)?;

        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::Io(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_file_store_roundtrip() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileKeyValueStore::new(temp_dir.path().join("data"));

        assert_eq!(store.get("workouts").await.unwrap(), None);

        store.set("workouts", "[1,2,3]").await.unwrap();
        assert_eq!(
            store.get("workouts").await.unwrap().as_deref(),
            Some("[1,2,3]")
        );
        assert!(temp_dir.path().join("data/workouts.json").exists());
        assert!(!temp_dir.path().join("data/workouts.json.tmp").exists());

        store.set("workouts", "[]").await.unwrap();
        assert_eq!(store.get("workouts").await.unwrap().as_deref(), Some("[]"));

        store.remove("workouts").await.unwrap();
        assert_eq!(store.get("workouts").await.unwrap(), None);

        // removing twice is fine
        store.remove("workouts").await.unwrap();
    }

    #[tokio::test]
    async fn test_rejects_path_like_keys() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileKeyValueStore::new(temp_dir.path());

        for key in ["", "../escape", "a/b", ".hidden"] {
            assert!(matches!(
                store.set(key, "x").await,
                Err(StorageError::InvalidKey(_))
            ));
        }
    }
}

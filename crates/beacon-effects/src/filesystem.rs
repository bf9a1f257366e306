//! Filesystem blob handler.
//!
//! Stores each key as a `<key>.dat` file under a base directory. Settings
//! keys are flat dotted names (`node.displayName`), so no tree traversal is
//! needed; parent directories are created on write. A write is durable once
//! `store` returns.

use async_trait::async_trait;
use beacon_core::{BlobStorageEffects, KvError};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Filesystem-backed blob store.
#[derive(Debug, Clone)]
pub struct FilesystemBlobHandler {
    base_path: PathBuf,
}

impl FilesystemBlobHandler {
    /// Create a handler rooted at `base_path`.
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    /// The directory blobs are stored under.
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn file_path(&self, key: &str) -> PathBuf {
        self.base_path.join(format!("{key}.dat"))
    }
}

#[async_trait]
impl BlobStorageEffects for FilesystemBlobHandler {
    async fn store(&self, key: &str, value: Vec<u8>) -> Result<(), KvError> {
        if key.is_empty() {
            return Err(KvError::WriteFailed {
                key: key.to_string(),
                reason: "key cannot be empty".to_string(),
            });
        }

        let file_path = self.file_path(key);
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| KvError::WriteFailed {
                key: key.to_string(),
                reason: format!("failed to create directory: {e}"),
            })?;
        }

        fs::write(&file_path, value)
            .await
            .map_err(|e| KvError::WriteFailed {
                key: key.to_string(),
                reason: format!("failed to write file: {e}"),
            })
    }

    async fn retrieve(&self, key: &str) -> Result<Option<Vec<u8>>, KvError> {
        let file_path = self.file_path(key);

        match fs::read(&file_path).await {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(KvError::ReadFailed {
                key: key.to_string(),
                reason: format!("failed to read file: {e}"),
            }),
        }
    }

    async fn remove(&self, key: &str) -> Result<bool, KvError> {
        let file_path = self.file_path(key);

        match fs::remove_file(&file_path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(KvError::WriteFailed {
                key: key.to_string(),
                reason: format!("failed to remove file: {e}"),
            }),
        }
    }

    async fn exists(&self, key: &str) -> Result<bool, KvError> {
        Ok(self.file_path(key).exists())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_store_and_retrieve() {
        let temp_dir = TempDir::new().unwrap();
        let handler = FilesystemBlobHandler::new(temp_dir.path());

        handler.store("node.displayName", b"blob".to_vec()).await.unwrap();
        assert_eq!(
            handler.retrieve("node.displayName").await.unwrap(),
            Some(b"blob".to_vec())
        );
        assert!(handler.exists("node.displayName").await.unwrap());
    }

    #[tokio::test]
    async fn test_missing_key_is_absent() {
        let temp_dir = TempDir::new().unwrap();
        let handler = FilesystemBlobHandler::new(temp_dir.path());

        assert_eq!(handler.retrieve("never.written").await.unwrap(), None);
        assert!(!handler.exists("never.written").await.unwrap());
        assert!(!handler.remove("never.written").await.unwrap());
    }

    #[tokio::test]
    async fn test_empty_key_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let handler = FilesystemBlobHandler::new(temp_dir.path());

        let result = handler.store("", b"blob".to_vec()).await;
        assert!(matches!(result, Err(KvError::WriteFailed { .. })));
    }

    #[tokio::test]
    async fn test_overwrite_replaces_value() {
        let temp_dir = TempDir::new().unwrap();
        let handler = FilesystemBlobHandler::new(temp_dir.path());

        handler.store("key", b"first".to_vec()).await.unwrap();
        handler.store("key", b"second".to_vec()).await.unwrap();
        assert_eq!(handler.retrieve("key").await.unwrap(), Some(b"second".to_vec()));
    }
}

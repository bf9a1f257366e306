//! In-memory blob handler.
//!
//! Durable only for the lifetime of the process. Useful as the substrate in
//! tests and ephemeral setups; clones share the same underlying map.

use async_trait::async_trait;
use beacon_core::{BlobStorageEffects, KvError};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// In-memory blob store backed by a shared map.
#[derive(Clone)]
pub struct MemoryBlobHandler {
    data: Arc<RwLock<HashMap<String, Vec<u8>>>>,
}

impl MemoryBlobHandler {
    /// Create a new, empty handler.
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl Default for MemoryBlobHandler {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BlobStorageEffects for MemoryBlobHandler {
    async fn store(&self, key: &str, value: Vec<u8>) -> Result<(), KvError> {
        let mut data = self.data.write().await;
        data.insert(key.to_string(), value);
        Ok(())
    }

    async fn retrieve(&self, key: &str) -> Result<Option<Vec<u8>>, KvError> {
        let data = self.data.read().await;
        Ok(data.get(key).cloned())
    }

    async fn remove(&self, key: &str) -> Result<bool, KvError> {
        let mut data = self.data.write().await;
        Ok(data.remove(key).is_some())
    }

    async fn exists(&self, key: &str) -> Result<bool, KvError> {
        let data = self.data.read().await;
        Ok(data.contains_key(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_store_retrieve_remove() {
        let handler = MemoryBlobHandler::new();

        handler.store("key", b"value".to_vec()).await.unwrap();
        assert_eq!(handler.retrieve("key").await.unwrap(), Some(b"value".to_vec()));
        assert!(handler.exists("key").await.unwrap());

        assert!(handler.remove("key").await.unwrap());
        assert!(!handler.exists("key").await.unwrap());
        assert_eq!(handler.retrieve("key").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_clones_share_data() {
        let handler = MemoryBlobHandler::new();
        let other = handler.clone();

        handler.store("shared", b"1".to_vec()).await.unwrap();
        assert_eq!(other.retrieve("shared").await.unwrap(), Some(b"1".to_vec()));
    }
}

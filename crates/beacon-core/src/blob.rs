//! Byte-level storage effect contract.
//!
//! The settings substrate one layer down: opaque blobs under string keys.
//! The encrypting handler in `beacon-effects` composes over this; nothing
//! above it ever sees raw blobs.

use async_trait::async_trait;

use crate::kv::KvError;

/// Durable per-key blob storage.
#[async_trait]
pub trait BlobStorageEffects: Send + Sync {
    /// Durably store a blob under `key`, replacing any previous value.
    async fn store(&self, key: &str, value: Vec<u8>) -> Result<(), KvError>;

    /// Retrieve the blob under `key`, `None` if absent.
    async fn retrieve(&self, key: &str) -> Result<Option<Vec<u8>>, KvError>;

    /// Remove the blob under `key`; returns whether anything was removed.
    async fn remove(&self, key: &str) -> Result<bool, KvError>;

    /// Whether a blob exists under `key`.
    async fn exists(&self, key: &str) -> Result<bool, KvError>;
}

//! Encrypting settings substrate.
//!
//! Implements the typed key-value contract over any blob store. Every value
//! is sealed with ChaCha20-Poly1305 under a per-key subkey derived from the
//! master key and the storage key via HKDF-SHA256, which binds each
//! ciphertext to the key it was written under: a blob copied to a different
//! key fails to authenticate.
//!
//! Blob layout: `version (1 byte) || nonce (12 bytes) || ciphertext`.
//!
//! Typed values are stored as the UTF-8 of their canonical string form
//! (`"true"`/`"false"`, decimal integers). An absent key yields the caller's
//! default; a present but unparseable value surfaces as corruption.

use async_trait::async_trait;
use beacon_core::{BlobStorageEffects, KvError, SecureKvEffects};
use chacha20poly1305::aead::Aead;
use chacha20poly1305::{ChaCha20Poly1305, Key, KeyInit, Nonce};
use hkdf::Hkdf;
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::Sha256;
use zeroize::Zeroizing;

/// Nonce size for ChaCha20-Poly1305 (96 bits).
const NONCE_SIZE: usize = 12;

/// Version byte for the encrypted blob format.
const BLOB_VERSION: u8 = 0x01;

/// HKDF info string for per-key subkey derivation.
const KEY_CONTEXT: &[u8] = b"beacon-settings-encryption-v1";

/// 256-bit master key material, zeroized on drop.
///
/// How this key is provisioned (platform credential store, password
/// derivation, ...) is the caller's concern; the handler only consumes it.
pub struct MasterKey(Zeroizing<[u8; 32]>);

impl MasterKey {
    /// Generate a fresh random master key.
    pub fn generate() -> Self {
        let mut bytes = [0u8; 32];
        OsRng.fill_bytes(&mut bytes);
        Self(Zeroizing::new(bytes))
    }

    /// Wrap existing key material.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(Zeroizing::new(bytes))
    }

    fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl std::fmt::Debug for MasterKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("MasterKey(..)")
    }
}

/// Encrypting typed key-value handler over any blob store.
pub struct EncryptedKv<S: BlobStorageEffects> {
    inner: S,
    master_key: MasterKey,
}

impl<S: BlobStorageEffects> EncryptedKv<S> {
    /// Create a handler sealing values into `inner` under `master_key`.
    pub fn new(inner: S, master_key: MasterKey) -> Self {
        Self { inner, master_key }
    }

    /// Derive the per-key encryption key.
    ///
    /// Binding the subkey to the storage key provides key separation without
    /// needing AAD: ciphertext moved across keys does not decrypt.
    fn derive_key(&self, storage_key: &str) -> Result<[u8; 32], KvError> {
        let hk = Hkdf::<Sha256>::new(Some(storage_key.as_bytes()), self.master_key.as_bytes());
        let mut subkey = [0u8; 32];
        hk.expand(KEY_CONTEXT, &mut subkey)
            .map_err(|_| KvError::EncryptionFailed {
                key: storage_key.to_string(),
                reason: "key derivation failed".to_string(),
            })?;
        Ok(subkey)
    }

    fn seal(&self, key: &str, plaintext: &[u8]) -> Result<Vec<u8>, KvError> {
        let subkey = self.derive_key(key)?;
        let cipher = ChaCha20Poly1305::new(Key::from_slice(&subkey));

        let mut nonce = [0u8; NONCE_SIZE];
        OsRng.fill_bytes(&mut nonce);

        let ciphertext = cipher
            .encrypt(Nonce::from_slice(&nonce), plaintext)
            .map_err(|_| KvError::EncryptionFailed {
                key: key.to_string(),
                reason: "aead seal failed".to_string(),
            })?;

        let mut blob = Vec::with_capacity(1 + NONCE_SIZE + ciphertext.len());
        blob.push(BLOB_VERSION);
        blob.extend_from_slice(&nonce);
        blob.extend_from_slice(&ciphertext);
        Ok(blob)
    }

    fn open(&self, key: &str, blob: &[u8]) -> Result<Vec<u8>, KvError> {
        if blob.len() < 1 + NONCE_SIZE {
            return Err(KvError::DecryptionFailed {
                key: key.to_string(),
                reason: "blob too short".to_string(),
            });
        }
        if blob[0] != BLOB_VERSION {
            return Err(KvError::DecryptionFailed {
                key: key.to_string(),
                reason: format!("unknown blob version: {}", blob[0]),
            });
        }

        let subkey = self.derive_key(key)?;
        let cipher = ChaCha20Poly1305::new(Key::from_slice(&subkey));
        let nonce = Nonce::from_slice(&blob[1..1 + NONCE_SIZE]);

        cipher
            .decrypt(nonce, &blob[1 + NONCE_SIZE..])
            .map_err(|_| KvError::DecryptionFailed {
                key: key.to_string(),
                reason: "authentication failed".to_string(),
            })
    }

    async fn get_plaintext(&self, key: &str) -> Result<Option<String>, KvError> {
        let blob = match self.inner.retrieve(key).await? {
            Some(blob) => blob,
            None => return Ok(None),
        };
        let plaintext = self.open(key, &blob)?;
        let value = String::from_utf8(plaintext).map_err(|_| KvError::CorruptValue {
            key: key.to_string(),
            reason: "not valid UTF-8".to_string(),
        })?;
        Ok(Some(value))
    }

    async fn put_plaintext(&self, key: &str, value: &str) -> Result<(), KvError> {
        let blob = self.seal(key, value.as_bytes())?;
        self.inner.store(key, blob).await
    }
}

#[async_trait]
impl<S: BlobStorageEffects> SecureKvEffects for EncryptedKv<S> {
    async fn get_string(&self, key: &str) -> Result<Option<String>, KvError> {
        self.get_plaintext(key).await
    }

    async fn get_bool(&self, key: &str, default: bool) -> Result<bool, KvError> {
        match self.get_plaintext(key).await? {
            None => Ok(default),
            Some(raw) => match raw.as_str() {
                "true" => Ok(true),
                "false" => Ok(false),
                other => Err(KvError::CorruptValue {
                    key: key.to_string(),
                    reason: format!("not a boolean: {other:?}"),
                }),
            },
        }
    }

    async fn get_int(&self, key: &str, default: i64) -> Result<i64, KvError> {
        match self.get_plaintext(key).await? {
            None => Ok(default),
            Some(raw) => raw.parse::<i64>().map_err(|_| KvError::CorruptValue {
                key: key.to_string(),
                reason: format!("not an integer: {raw:?}"),
            }),
        }
    }

    async fn put_string(&self, key: &str, value: &str) -> Result<(), KvError> {
        self.put_plaintext(key, value).await
    }

    async fn put_bool(&self, key: &str, value: bool) -> Result<(), KvError> {
        self.put_plaintext(key, if value { "true" } else { "false" }).await
    }

    async fn put_int(&self, key: &str, value: i64) -> Result<(), KvError> {
        self.put_plaintext(key, &value.to_string()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryBlobHandler;

    fn test_kv() -> (EncryptedKv<MemoryBlobHandler>, MemoryBlobHandler) {
        let blobs = MemoryBlobHandler::new();
        let kv = EncryptedKv::new(blobs.clone(), MasterKey::generate());
        (kv, blobs)
    }

    #[tokio::test]
    async fn test_round_trips_typed_values() {
        let (kv, _) = test_kv();

        kv.put_string("s", "hello").await.unwrap();
        kv.put_bool("b", true).await.unwrap();
        kv.put_int("i", -42).await.unwrap();

        assert_eq!(kv.get_string("s").await.unwrap(), Some("hello".to_string()));
        assert!(kv.get_bool("b", false).await.unwrap());
        assert_eq!(kv.get_int("i", 0).await.unwrap(), -42);
    }

    #[tokio::test]
    async fn test_absent_keys_yield_defaults() {
        let (kv, _) = test_kv();

        assert_eq!(kv.get_string("missing").await.unwrap(), None);
        assert!(kv.get_bool("missing", true).await.unwrap());
        assert_eq!(kv.get_int("missing", 18790).await.unwrap(), 18790);
    }

    #[tokio::test]
    async fn test_stored_blob_is_not_plaintext() {
        let (kv, blobs) = test_kv();

        kv.put_string("secret", "plainly visible").await.unwrap();
        let blob = blobs.retrieve("secret").await.unwrap().unwrap();

        assert_eq!(blob[0], BLOB_VERSION);
        assert!(blob.len() > 1 + NONCE_SIZE);
        let haystack = &blob[1 + NONCE_SIZE..];
        assert!(!haystack
            .windows(b"plainly".len())
            .any(|w| w == b"plainly"));
    }

    #[tokio::test]
    async fn test_tampered_blob_fails_to_open() {
        let (kv, blobs) = test_kv();

        kv.put_string("key", "value").await.unwrap();
        let mut blob = blobs.retrieve("key").await.unwrap().unwrap();
        let last = blob.len() - 1;
        blob[last] ^= 0x01;
        blobs.store("key", blob).await.unwrap();

        let result = kv.get_string("key").await;
        assert!(matches!(result, Err(KvError::DecryptionFailed { .. })));
    }

    #[tokio::test]
    async fn test_ciphertext_is_bound_to_its_key() {
        let (kv, blobs) = test_kv();

        kv.put_string("original", "value").await.unwrap();
        let blob = blobs.retrieve("original").await.unwrap().unwrap();
        blobs.store("relocated", blob).await.unwrap();

        let result = kv.get_string("relocated").await;
        assert!(matches!(result, Err(KvError::DecryptionFailed { .. })));
    }

    #[tokio::test]
    async fn test_garbage_blob_is_rejected() {
        let (kv, blobs) = test_kv();

        blobs.store("short", vec![BLOB_VERSION]).await.unwrap();
        assert!(matches!(
            kv.get_string("short").await,
            Err(KvError::DecryptionFailed { .. })
        ));

        blobs.store("unknown_version", vec![0x7f; 64]).await.unwrap();
        assert!(matches!(
            kv.get_string("unknown_version").await,
            Err(KvError::DecryptionFailed { .. })
        ));
    }

    #[tokio::test]
    async fn test_mistyped_value_is_corrupt() {
        let (kv, _) = test_kv();

        kv.put_string("b", "maybe").await.unwrap();
        assert!(matches!(
            kv.get_bool("b", false).await,
            Err(KvError::CorruptValue { .. })
        ));

        kv.put_string("i", "eighteen").await.unwrap();
        assert!(matches!(
            kv.get_int("i", 0).await,
            Err(KvError::CorruptValue { .. })
        ));
    }

    #[tokio::test]
    async fn test_distinct_master_keys_do_not_interoperate() {
        let blobs = MemoryBlobHandler::new();
        let kv_a = EncryptedKv::new(blobs.clone(), MasterKey::generate());
        let kv_b = EncryptedKv::new(blobs.clone(), MasterKey::generate());

        kv_a.put_string("key", "value").await.unwrap();
        assert!(matches!(
            kv_b.get_string("key").await,
            Err(KvError::DecryptionFailed { .. })
        ));
    }
}

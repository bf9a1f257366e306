//! Typed key-value effect contract for the encrypting settings substrate.
//!
//! Values returned by `get_*` are plaintext; confidentiality at rest is the
//! handler's job. Each completed `put_*` is durable and visible to a
//! subsequent `get_*` in the same process before the call returns. There is
//! no atomicity across keys.

use async_trait::async_trait;

/// Error type for backing-store operations.
///
/// Any of these is fatal for the operation in progress: the settings layer
/// never retries, never falls back to plaintext storage, and never updates
/// observable state after a failed write.
#[derive(Debug, thiserror::Error)]
pub enum KvError {
    /// Reading a stored value failed.
    #[error("read failed for `{key}`: {reason}")]
    ReadFailed {
        /// Key the read was issued against.
        key: String,
        /// Underlying failure description.
        reason: String,
    },

    /// Writing a value failed; nothing durable can be assumed.
    #[error("write failed for `{key}`: {reason}")]
    WriteFailed {
        /// Key the write was issued against.
        key: String,
        /// Underlying failure description.
        reason: String,
    },

    /// Encrypting a value before storage failed.
    #[error("encryption failed for `{key}`: {reason}")]
    EncryptionFailed {
        /// Key the value was being sealed for.
        key: String,
        /// Underlying failure description.
        reason: String,
    },

    /// A stored blob could not be authenticated or decrypted.
    #[error("decryption failed for `{key}`: {reason}")]
    DecryptionFailed {
        /// Key the blob was read from.
        key: String,
        /// Underlying failure description.
        reason: String,
    },

    /// A value was present but not parseable as the requested type.
    #[error("corrupt value under `{key}`: {reason}")]
    CorruptValue {
        /// Key holding the corrupt value.
        key: String,
        /// Why the value did not parse.
        reason: String,
    },
}

/// Typed, durable, per-key settings storage.
///
/// The typed getters take a literal default that is substituted when the key
/// was never written; a present-but-unparseable value is surfaced as
/// [`KvError::CorruptValue`] instead.
#[async_trait]
pub trait SecureKvEffects: Send + Sync {
    /// Read a string value, `None` if the key was never written.
    async fn get_string(&self, key: &str) -> Result<Option<String>, KvError>;

    /// Read a boolean value, falling back to `default` when absent.
    async fn get_bool(&self, key: &str, default: bool) -> Result<bool, KvError>;

    /// Read an integer value, falling back to `default` when absent.
    async fn get_int(&self, key: &str, default: i64) -> Result<i64, KvError>;

    /// Durably write a string value.
    async fn put_string(&self, key: &str, value: &str) -> Result<(), KvError>;

    /// Durably write a boolean value.
    async fn put_bool(&self, key: &str, value: bool) -> Result<(), KvError>;

    /// Durably write an integer value.
    async fn put_int(&self, key: &str, value: i64) -> Result<(), KvError>;
}

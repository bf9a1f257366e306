//! Shared in-memory test double for the typed settings contract.

use async_trait::async_trait;
use beacon_core::{KvError, SecureKvEffects};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

/// Plaintext in-memory store with write counting and injectable write
/// failures. Lock scope never spans an await.
pub struct TestKv {
    data: Mutex<HashMap<String, String>>,
    writes: AtomicUsize,
    fail_writes: AtomicBool,
}

impl TestKv {
    pub fn new() -> Self {
        Self {
            data: Mutex::new(HashMap::new()),
            writes: AtomicUsize::new(0),
            fail_writes: AtomicBool::new(false),
        }
    }

    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn reset_write_count(&self) {
        self.writes.store(0, Ordering::SeqCst);
    }

    /// Make every subsequent put fail without touching stored data.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn read(&self, key: &str) -> Result<Option<String>, KvError> {
        let data = self.data.lock().map_err(|e| KvError::ReadFailed {
            key: key.to_string(),
            reason: e.to_string(),
        })?;
        Ok(data.get(key).cloned())
    }

    fn write(&self, key: &str, value: String) -> Result<(), KvError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(KvError::WriteFailed {
                key: key.to_string(),
                reason: "injected failure".to_string(),
            });
        }
        let mut data = self.data.lock().map_err(|e| KvError::WriteFailed {
            key: key.to_string(),
            reason: e.to_string(),
        })?;
        data.insert(key.to_string(), value);
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[async_trait]
impl SecureKvEffects for TestKv {
    async fn get_string(&self, key: &str) -> Result<Option<String>, KvError> {
        self.read(key)
    }

    async fn get_bool(&self, key: &str, default: bool) -> Result<bool, KvError> {
        match self.read(key)? {
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
        match self.read(key)? {
            None => Ok(default),
            Some(raw) => raw.parse::<i64>().map_err(|_| KvError::CorruptValue {
                key: key.to_string(),
                reason: format!("not an integer: {raw:?}"),
            }),
        }
    }

    async fn put_string(&self, key: &str, value: &str) -> Result<(), KvError> {
        self.write(key, value.to_string())
    }

    async fn put_bool(&self, key: &str, value: bool) -> Result<(), KvError> {
        self.write(key, if value { "true" } else { "false" }.to_string())
    }

    async fn put_int(&self, key: &str, value: i64) -> Result<(), KvError> {
        self.write(key, value.to_string())
    }
}

//! Instance identity lifecycle.
//!
//! The instance id names this installation to remote peers and scopes the
//! bridge token. It is generated once and never regenerated while the
//! backing store retains it; a blank stored value counts as absent.

use beacon_core::{KvError, SecureKvEffects};
use uuid::Uuid;

/// Storage key for the per-installation instance id.
pub const INSTANCE_ID_KEY: &str = "node.instanceId";

/// Load the stored instance id, creating and persisting a fresh one when
/// the stored value is absent or blank.
///
/// Repeated calls against a populated store return the stored value with no
/// further writes; exactly one write occurs the first time this runs
/// against an empty store.
pub async fn load_or_create<S: SecureKvEffects>(store: &S) -> Result<String, KvError> {
    if let Some(existing) = store.get_string(INSTANCE_ID_KEY).await? {
        let trimmed = existing.trim();
        if !trimmed.is_empty() {
            return Ok(trimmed.to_string());
        }
    }

    let fresh = Uuid::new_v4().to_string();
    store.put_string(INSTANCE_ID_KEY, &fresh).await?;
    tracing::debug!(instance_id = %fresh, "generated fresh instance id");
    Ok(fresh)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::TestKv;

    #[tokio::test]
    async fn test_creates_and_persists_once() {
        let store = TestKv::new();

        let first = load_or_create(&store).await.unwrap();
        assert!(!first.is_empty());
        assert_eq!(store.write_count(), 1);

        let second = load_or_create(&store).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(store.write_count(), 1);
    }

    #[tokio::test]
    async fn test_existing_value_wins() {
        let store = TestKv::new();
        store.put_string(INSTANCE_ID_KEY, "existing-id").await.unwrap();
        store.reset_write_count();

        let id = load_or_create(&store).await.unwrap();
        assert_eq!(id, "existing-id");
        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test]
    async fn test_blank_stored_value_counts_as_absent() {
        let store = TestKv::new();
        store.put_string(INSTANCE_ID_KEY, "   ").await.unwrap();
        store.reset_write_count();

        let id = load_or_create(&store).await.unwrap();
        assert!(!id.trim().is_empty());
        assert_eq!(store.write_count(), 1);
    }

    #[tokio::test]
    async fn test_stored_value_is_trimmed() {
        let store = TestKv::new();
        store.put_string(INSTANCE_ID_KEY, "  padded-id  ").await.unwrap();

        let id = load_or_create(&store).await.unwrap();
        assert_eq!(id, "padded-id");
    }
}

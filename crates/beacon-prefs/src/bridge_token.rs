//! Bridge-token vault.
//!
//! The pairing secret for the remote bridge service is keyed by instance
//! id, so a restored backup or cloned store never carries a token bound to
//! another installation's registration. The token is read on demand and
//! never held in a watch cell.

use beacon_core::{KvError, SecureKvEffects};

/// Prefix for per-instance bridge-token keys.
pub const BRIDGE_TOKEN_PREFIX: &str = "bridge.token.";

fn token_key(instance_id: &str) -> String {
    format!("{BRIDGE_TOKEN_PREFIX}{instance_id}")
}

/// Load the bridge token saved for `instance_id`, if any.
pub async fn load<S: SecureKvEffects>(
    store: &S,
    instance_id: &str,
) -> Result<Option<String>, KvError> {
    store.get_string(&token_key(instance_id)).await
}

/// Save the bridge token for `instance_id`. The token is trimmed.
pub async fn save<S: SecureKvEffects>(
    store: &S,
    instance_id: &str,
    token: &str,
) -> Result<(), KvError> {
    store.put_string(&token_key(instance_id), token.trim()).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::TestKv;

    #[tokio::test]
    async fn test_tokens_are_namespaced_by_instance() {
        let store = TestKv::new();

        save(&store, "id-A", "tok1").await.unwrap();

        assert_eq!(load(&store, "id-A").await.unwrap(), Some("tok1".to_string()));
        assert_eq!(load(&store, "id-B").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_token_is_trimmed_on_save() {
        let store = TestKv::new();

        save(&store, "id-A", "  tok1\n").await.unwrap();
        assert_eq!(load(&store, "id-A").await.unwrap(), Some("tok1".to_string()));
    }

    #[tokio::test]
    async fn test_absent_until_first_save() {
        let store = TestKv::new();
        assert_eq!(load(&store, "id-A").await.unwrap(), None);
    }
}

//! Display-name resolution and one-time migration.
//!
//! A stored name the user chose always wins and is never overwritten by
//! migration logic. Absent, blank, or still-placeholder values are
//! re-derived from the device-name heuristic and persisted, so later loads
//! short-circuit to the stored-value branch instead of deriving every time.

use beacon_core::{KvError, SecureKvEffects};

/// Storage key for the node display name.
pub const DISPLAY_NAME_KEY: &str = "node.displayName";

/// Placeholder written by early builds before name derivation existed.
///
/// A stored name equal to this is treated as "still default" and migrated;
/// it also serves as the final fallback when the heuristic yields nothing.
pub const DEFAULT_NODE_NAME: &str = "Beacon Node";

/// Source of a human-readable default name for this device.
///
/// External heuristic; implementations may consult the OS. Returning `None`
/// or a blank string falls back to [`DEFAULT_NODE_NAME`].
pub trait DeviceNameSource: Send + Sync {
    /// Best available device name, if any.
    fn device_name(&self) -> Option<String>;
}

/// Device name derived from the OS hostname.
#[derive(Debug, Default)]
pub struct HostnameSource;

impl DeviceNameSource for HostnameSource {
    fn device_name(&self) -> Option<String> {
        hostname::get()
            .ok()
            .map(|name| name.to_string_lossy().into_owned())
    }
}

/// Load the stored display name, migrating placeholder or missing values.
///
/// Performs zero writes on the user-value branch; the migration branch
/// persists the derived name exactly once so the placeholder never survives
/// a successful load.
pub async fn load_or_migrate<S: SecureKvEffects>(
    store: &S,
    source: &dyn DeviceNameSource,
) -> Result<String, KvError> {
    if let Some(existing) = store.get_string(DISPLAY_NAME_KEY).await? {
        let trimmed = existing.trim();
        if !trimmed.is_empty() && trimmed != DEFAULT_NODE_NAME {
            return Ok(trimmed.to_string());
        }
    }

    let candidate = source.device_name().unwrap_or_default();
    let trimmed = candidate.trim();
    let resolved = if trimmed.is_empty() {
        DEFAULT_NODE_NAME
    } else {
        trimmed
    };

    store.put_string(DISPLAY_NAME_KEY, resolved).await?;
    tracing::debug!(name = %resolved, "migrated display name");
    Ok(resolved.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::TestKv;

    struct FixedName(Option<&'static str>);

    impl DeviceNameSource for FixedName {
        fn device_name(&self) -> Option<String> {
            self.0.map(str::to_string)
        }
    }

    #[tokio::test]
    async fn test_user_value_wins_with_zero_writes() {
        let store = TestKv::new();
        store.put_string(DISPLAY_NAME_KEY, "MyPhone").await.unwrap();
        store.reset_write_count();

        let name = load_or_migrate(&store, &FixedName(Some("ignored"))).await.unwrap();
        assert_eq!(name, "MyPhone");
        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test]
    async fn test_absent_value_migrates_from_heuristic() {
        let store = TestKv::new();

        let name = load_or_migrate(&store, &FixedName(Some("  Kitchen Display ")))
            .await
            .unwrap();
        assert_eq!(name, "Kitchen Display");
        assert_eq!(
            store.get_string(DISPLAY_NAME_KEY).await.unwrap(),
            Some("Kitchen Display".to_string())
        );
    }

    #[tokio::test]
    async fn test_placeholder_is_migrated() {
        let store = TestKv::new();
        store.put_string(DISPLAY_NAME_KEY, DEFAULT_NODE_NAME).await.unwrap();
        store.reset_write_count();

        let name = load_or_migrate(&store, &FixedName(Some("Living Room"))).await.unwrap();
        assert_eq!(name, "Living Room");
        assert_eq!(store.write_count(), 1);
    }

    #[tokio::test]
    async fn test_empty_heuristic_falls_back_to_default() {
        let store = TestKv::new();

        let name = load_or_migrate(&store, &FixedName(None)).await.unwrap();
        assert_eq!(name, DEFAULT_NODE_NAME);

        let blank = TestKv::new();
        let name = load_or_migrate(&blank, &FixedName(Some("   "))).await.unwrap();
        assert_eq!(name, DEFAULT_NODE_NAME);
    }

    #[tokio::test]
    async fn test_migration_short_circuits_next_load() {
        let store = TestKv::new();

        load_or_migrate(&store, &FixedName(Some("Hallway"))).await.unwrap();
        store.reset_write_count();

        let name = load_or_migrate(&store, &FixedName(Some("Different"))).await.unwrap();
        assert_eq!(name, "Hallway");
        assert_eq!(store.write_count(), 0);
    }
}

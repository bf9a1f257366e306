//! Reactive settings store.
//!
//! One watch cell per setting, hydrated from the encrypting store at load
//! time. Every setter normalizes, persists, then publishes — in that order.
//! A failed durable write surfaces the error and leaves the cell at its
//! prior value; there is no rollback path and no observer ever sees
//! unpersisted state.
//!
//! Cell reads never block and never touch the backing store. The store is
//! built for a single logical writer; concurrent setters on the *same*
//! field must be serialized by the caller.

use std::sync::Arc;

use beacon_core::wake_words::{self, default_wake_words};
use beacon_core::{KvError, SecureKvEffects};
use tokio::sync::watch;

use crate::bridge_token;
use crate::display_name::{self, DeviceNameSource};
use crate::identity;

const CAMERA_ENABLED_KEY: &str = "camera.enabled";
const PREVENT_SLEEP_KEY: &str = "screen.preventSleep";
const MANUAL_ENABLED_KEY: &str = "bridge.manual.enabled";
const MANUAL_HOST_KEY: &str = "bridge.manual.host";
const MANUAL_PORT_KEY: &str = "bridge.manual.port";
const LAST_DISCOVERED_KEY: &str = "bridge.lastDiscoveredStableId";
const WAKE_WORDS_KEY: &str = "voiceWake.triggerWords";

/// Default port for a manually configured bridge.
pub const DEFAULT_MANUAL_PORT: i64 = 18790;

/// Errors surfaced by the settings store.
#[derive(Debug, thiserror::Error)]
pub enum PrefsError {
    /// The backing store failed; the observable value is unchanged.
    #[error(transparent)]
    Store(#[from] KvError),
}

/// Reactive settings store over an encrypting key-value substrate.
///
/// Owns one watch cell per setting. The substrate is shared infrastructure
/// and is held behind an `Arc`; the cells are owned exclusively.
pub struct SecurePrefs<S> {
    store: Arc<S>,
    instance_id: watch::Sender<String>,
    display_name: watch::Sender<String>,
    camera_enabled: watch::Sender<bool>,
    prevent_sleep: watch::Sender<bool>,
    manual_enabled: watch::Sender<bool>,
    manual_host: watch::Sender<String>,
    manual_port: watch::Sender<i64>,
    last_discovered_stable_id: watch::Sender<String>,
    wake_words: watch::Sender<Vec<String>>,
}

impl<S: SecureKvEffects> SecurePrefs<S> {
    /// Hydrate every cell from `store`.
    ///
    /// Runs the identity and display-name resolvers first (each may perform
    /// its one-time write), then hydrates the flat fields with their literal
    /// defaults. Stored wake words are decoded and re-sanitized defensively,
    /// so pre-existing or corrupted data never reaches an observer raw.
    pub async fn load(
        store: Arc<S>,
        device_names: &dyn DeviceNameSource,
    ) -> Result<Self, PrefsError> {
        let instance_id = identity::load_or_create(store.as_ref()).await?;
        let display_name = display_name::load_or_migrate(store.as_ref(), device_names).await?;

        let camera_enabled = store.get_bool(CAMERA_ENABLED_KEY, true).await?;
        let prevent_sleep = store.get_bool(PREVENT_SLEEP_KEY, true).await?;
        let manual_enabled = store.get_bool(MANUAL_ENABLED_KEY, false).await?;
        let manual_host = store.get_string(MANUAL_HOST_KEY).await?.unwrap_or_default();
        let manual_port = store.get_int(MANUAL_PORT_KEY, DEFAULT_MANUAL_PORT).await?;
        let last_discovered = store
            .get_string(LAST_DISCOVERED_KEY)
            .await?
            .unwrap_or_default();
        let wake = Self::load_wake_words(store.as_ref()).await?;

        Ok(Self {
            store,
            instance_id: watch::channel(instance_id).0,
            display_name: watch::channel(display_name).0,
            camera_enabled: watch::channel(camera_enabled).0,
            prevent_sleep: watch::channel(prevent_sleep).0,
            manual_enabled: watch::channel(manual_enabled).0,
            manual_host: watch::channel(manual_host).0,
            manual_port: watch::channel(manual_port).0,
            last_discovered_stable_id: watch::channel(last_discovered).0,
            wake_words: watch::channel(wake).0,
        })
    }

    async fn load_wake_words(store: &S) -> Result<Vec<String>, KvError> {
        let raw = store.get_string(WAKE_WORDS_KEY).await?;
        let decoded = wake_words::decode_list(raw.as_deref());
        Ok(wake_words::sanitize(&decoded, &default_wake_words()))
    }

    /// Per-installation instance id. Immutable after load.
    pub fn instance_id(&self) -> String {
        self.instance_id.borrow().clone()
    }

    /// Subscribe to the instance id cell.
    pub fn watch_instance_id(&self) -> watch::Receiver<String> {
        self.instance_id.subscribe()
    }

    /// Current display name.
    pub fn display_name(&self) -> String {
        self.display_name.borrow().clone()
    }

    /// Subscribe to display-name updates.
    pub fn watch_display_name(&self) -> watch::Receiver<String> {
        self.display_name.subscribe()
    }

    /// Whether the camera is enabled.
    pub fn camera_enabled(&self) -> bool {
        *self.camera_enabled.borrow()
    }

    /// Subscribe to camera-enabled updates.
    pub fn watch_camera_enabled(&self) -> watch::Receiver<bool> {
        self.camera_enabled.subscribe()
    }

    /// Whether the screen is kept awake.
    pub fn prevent_sleep(&self) -> bool {
        *self.prevent_sleep.borrow()
    }

    /// Subscribe to prevent-sleep updates.
    pub fn watch_prevent_sleep(&self) -> watch::Receiver<bool> {
        self.prevent_sleep.subscribe()
    }

    /// Whether a manually configured bridge is used.
    pub fn manual_enabled(&self) -> bool {
        *self.manual_enabled.borrow()
    }

    /// Subscribe to manual-enabled updates.
    pub fn watch_manual_enabled(&self) -> watch::Receiver<bool> {
        self.manual_enabled.subscribe()
    }

    /// Manually configured bridge host. May be blank.
    pub fn manual_host(&self) -> String {
        self.manual_host.borrow().clone()
    }

    /// Subscribe to manual-host updates.
    pub fn watch_manual_host(&self) -> watch::Receiver<String> {
        self.manual_host.subscribe()
    }

    /// Manually configured bridge port.
    pub fn manual_port(&self) -> i64 {
        *self.manual_port.borrow()
    }

    /// Subscribe to manual-port updates.
    pub fn watch_manual_port(&self) -> watch::Receiver<i64> {
        self.manual_port.subscribe()
    }

    /// Stable id of the last bridge found via discovery.
    pub fn last_discovered_stable_id(&self) -> String {
        self.last_discovered_stable_id.borrow().clone()
    }

    /// Subscribe to last-discovered-id updates.
    pub fn watch_last_discovered_stable_id(&self) -> watch::Receiver<String> {
        self.last_discovered_stable_id.subscribe()
    }

    /// Current sanitized wake words.
    pub fn wake_words(&self) -> Vec<String> {
        self.wake_words.borrow().clone()
    }

    /// Subscribe to wake-word updates.
    pub fn watch_wake_words(&self) -> watch::Receiver<Vec<String>> {
        self.wake_words.subscribe()
    }

    /// Set the display name. Trimmed, persisted, then published.
    pub async fn set_display_name(&self, value: &str) -> Result<(), PrefsError> {
        let trimmed = value.trim();
        self.store
            .put_string(display_name::DISPLAY_NAME_KEY, trimmed)
            .await?;
        self.display_name.send_replace(trimmed.to_string());
        Ok(())
    }

    /// Enable or disable the camera.
    pub async fn set_camera_enabled(&self, value: bool) -> Result<(), PrefsError> {
        self.store.put_bool(CAMERA_ENABLED_KEY, value).await?;
        self.camera_enabled.send_replace(value);
        Ok(())
    }

    /// Enable or disable keeping the screen awake.
    pub async fn set_prevent_sleep(&self, value: bool) -> Result<(), PrefsError> {
        self.store.put_bool(PREVENT_SLEEP_KEY, value).await?;
        self.prevent_sleep.send_replace(value);
        Ok(())
    }

    /// Enable or disable the manually configured bridge.
    pub async fn set_manual_enabled(&self, value: bool) -> Result<(), PrefsError> {
        self.store.put_bool(MANUAL_ENABLED_KEY, value).await?;
        self.manual_enabled.send_replace(value);
        Ok(())
    }

    /// Set the manual bridge host. Trimmed; no format validation here.
    pub async fn set_manual_host(&self, value: &str) -> Result<(), PrefsError> {
        let trimmed = value.trim();
        self.store.put_string(MANUAL_HOST_KEY, trimmed).await?;
        self.manual_host.send_replace(trimmed.to_string());
        Ok(())
    }

    /// Set the manual bridge port. No range validation here.
    pub async fn set_manual_port(&self, value: i64) -> Result<(), PrefsError> {
        self.store.put_int(MANUAL_PORT_KEY, value).await?;
        self.manual_port.send_replace(value);
        Ok(())
    }

    /// Record the stable id of the last discovered bridge. Trimmed.
    pub async fn set_last_discovered_stable_id(&self, value: &str) -> Result<(), PrefsError> {
        let trimmed = value.trim();
        self.store.put_string(LAST_DISCOVERED_KEY, trimmed).await?;
        self.last_discovered_stable_id
            .send_replace(trimmed.to_string());
        Ok(())
    }

    /// Set the wake words. Sanitized, encoded, persisted, then published —
    /// the cell always carries the sanitized form.
    pub async fn set_wake_words(&self, words: Vec<String>) -> Result<(), PrefsError> {
        let sanitized = wake_words::sanitize(&words, &default_wake_words());
        let encoded = wake_words::encode_list(&sanitized);
        self.store.put_string(WAKE_WORDS_KEY, &encoded).await?;
        self.wake_words.send_replace(sanitized);
        Ok(())
    }

    /// Load the bridge token saved for this installation, if any.
    ///
    /// Pull-only by design: the secret is fetched on demand and never held
    /// in a cell.
    pub async fn load_bridge_token(&self) -> Result<Option<String>, PrefsError> {
        Ok(bridge_token::load(self.store.as_ref(), &self.instance_id()).await?)
    }

    /// Save the bridge token for this installation. Trimmed.
    pub async fn save_bridge_token(&self, token: &str) -> Result<(), PrefsError> {
        Ok(bridge_token::save(self.store.as_ref(), &self.instance_id(), token).await?)
    }
}

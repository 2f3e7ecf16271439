use async_trait::async_trait;
use tokio::sync::{Mutex, watch};
use tracing::{debug, warn};

use crate::db::KeyValueStorage;
use crate::domain::{Settings, SettingsManager, SettingsUpdate};
use crate::error::CatalogError;

pub const SETTINGS_KEY: &str = "SETTINGS_KEY";

/// Settings persisted as one JSON blob in the key-value table and published
/// on a watch channel.
pub struct KvSettingsManager {
    storage: KeyValueStorage,
    tx: watch::Sender<Settings>,
    write_lock: Mutex<()>,
}

impl KvSettingsManager {
    pub async fn load(storage: KeyValueStorage) -> Result<Self, CatalogError> {
        let settings = read_or_create(&storage).await?;
        let (tx, _rx) = watch::channel(settings);
        Ok(Self {
            storage,
            tx,
            write_lock: Mutex::new(()),
        })
    }
}

/// Stored value, or defaults (persisted when nothing was stored yet).
async fn read_or_create(storage: &KeyValueStorage) -> Result<Settings, CatalogError> {
    match storage.get(SETTINGS_KEY).await? {
        Some(json) => Ok(serde_json::from_str(&json).unwrap_or_else(|e| {
            warn!(error = %e, "stored settings are malformed; using defaults");
            Settings::default()
        })),
        None => {
            let settings = Settings::default();
            storage
                .put(SETTINGS_KEY, &serde_json::to_string(&settings)?)
                .await?;
            debug!("default settings created");
            Ok(settings)
        }
    }
}

#[async_trait]
impl SettingsManager for KvSettingsManager {
    fn settings(&self) -> Settings {
        *self.tx.borrow()
    }

    fn subscribe(&self) -> watch::Receiver<Settings> {
        self.tx.subscribe()
    }

    async fn save(&self, update: SettingsUpdate) -> Result<Settings, CatalogError> {
        let _guard = self.write_lock.lock().await;
        let next = update(self.settings());
        self.storage
            .put(SETTINGS_KEY, &serde_json::to_string(&next)?)
            .await?;
        // Publish what was actually stored.
        let stored = read_or_create(&self.storage).await?;
        self.tx.send_replace(stored);
        debug!(?stored, "settings saved");
        Ok(stored)
    }
}

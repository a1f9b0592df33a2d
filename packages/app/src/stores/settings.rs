//! 设置仓库：内存中的一份 [`Settings`]，逐键修改，整体持久化。

use parking_lot::RwLock;
use serde_json::Value;
use tracing::debug;

use crate::storage::{ProfileStorage, Settings, SettingsError, StorageResult};

#[derive(Default)]
pub struct SettingsStore {
    settings: RwLock<Settings>,
}

impl SettingsStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> Settings {
        self.settings.read().clone()
    }

    pub fn set(&self, key: &str, value: Value) -> Result<(), SettingsError> {
        self.settings.write().set(key, value)
    }

    pub fn replace_all(&self, settings: Settings) {
        *self.settings.write() = settings;
    }

    pub fn reset(&self) {
        *self.settings.write() = Settings::default();
    }

    pub fn load_from(&self, storage: &ProfileStorage) {
        let settings = storage.settings();
        debug!("loaded settings");
        *self.settings.write() = settings;
    }

    pub fn save_to(&self, storage: &ProfileStorage) -> StorageResult<()> {
        storage.save_settings(&self.settings.read())
    }
}

//! Settings service
//!
//! User display settings behind the `SettingsPort` seam. The store reads
//! them once at construction and writes them back on every layout or
//! font-size change.

use crate::config::{DEFAULT_FONT_SIZE, DEFAULT_GRID_LAYOUT, SETTINGS_FILE_NAME};
use crate::error::{AppError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Persisted user display settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UserSettings {
    #[serde(default = "default_grid_layout")]
    pub is_grid_layout: bool,
    #[serde(default = "default_font_size")]
    pub font_size: f32,
}

fn default_grid_layout() -> bool {
    DEFAULT_GRID_LAYOUT
}

fn default_font_size() -> f32 {
    DEFAULT_FONT_SIZE
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            is_grid_layout: default_grid_layout(),
            font_size: default_font_size(),
        }
    }
}

/// Key-value backing store for user settings
pub trait SettingsPort: Send + Sync {
    fn load(&self) -> Result<UserSettings>;
    fn save(&self, settings: &UserSettings) -> Result<()>;
}

/// Settings stored as JSON in the application data directory
#[derive(Clone)]
pub struct JsonSettingsStore {
    settings_path: PathBuf,
}

impl JsonSettingsStore {
    pub fn new(app_data_dir: &Path) -> Self {
        Self {
            settings_path: app_data_dir.join(SETTINGS_FILE_NAME),
        }
    }

    pub fn path(&self) -> &Path {
        &self.settings_path
    }
}

impl SettingsPort for JsonSettingsStore {
    /// Load settings from disk or create defaults if the file does not exist
    fn load(&self) -> Result<UserSettings> {
        if !self.settings_path.exists() {
            tracing::info!("Settings file not found, creating default settings");
            let default = UserSettings::default();
            self.save(&default)?;
            return Ok(default);
        }

        let content = std::fs::read_to_string(&self.settings_path)?;
        let settings: UserSettings = serde_json::from_str(&content)
            .map_err(|e| AppError::Settings(format!("Failed to parse settings: {}", e)))?;

        Ok(settings)
    }

    fn save(&self, settings: &UserSettings) -> Result<()> {
        let content = serde_json::to_string_pretty(settings)?;

        if let Some(parent) = self.settings_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.settings_path, content)?;
        tracing::debug!("Settings saved to {:?}", self.settings_path);

        Ok(())
    }
}

/// Process-local settings. Clones share the same values.
#[derive(Clone, Default)]
pub struct InMemorySettings {
    inner: Arc<Mutex<UserSettings>>,
}

impl InMemorySettings {
    pub fn new(settings: UserSettings) -> Self {
        Self {
            inner: Arc::new(Mutex::new(settings)),
        }
    }
}

impl SettingsPort for InMemorySettings {
    fn load(&self) -> Result<UserSettings> {
        self.inner
            .lock()
            .map(|settings| *settings)
            .map_err(|_| AppError::Settings("settings lock poisoned".to_string()))
    }

    fn save(&self, settings: &UserSettings) -> Result<()> {
        let mut current = self
            .inner
            .lock()
            .map_err(|_| AppError::Settings("settings lock poisoned".to_string()))?;
        *current = *settings;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_settings_created_on_load() {
        let temp = TempDir::new().unwrap();
        let store = JsonSettingsStore::new(temp.path());

        let settings = store.load().unwrap();

        assert!(settings.is_grid_layout);
        assert_eq!(settings.font_size, 16.0);
        assert!(store.path().exists());
    }

    #[test]
    fn test_settings_persistence() {
        let temp = TempDir::new().unwrap();

        {
            let store = JsonSettingsStore::new(temp.path());
            store
                .save(&UserSettings {
                    is_grid_layout: false,
                    font_size: 20.0,
                })
                .unwrap();
        }

        let store = JsonSettingsStore::new(temp.path());
        let loaded = store.load().unwrap();
        assert!(!loaded.is_grid_layout);
        assert_eq!(loaded.font_size, 20.0);
    }

    #[test]
    fn test_missing_keys_fall_back_to_defaults() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join(SETTINGS_FILE_NAME), r#"{"font_size": 24.0}"#).unwrap();

        let loaded = JsonSettingsStore::new(temp.path()).load().unwrap();

        assert!(loaded.is_grid_layout);
        assert_eq!(loaded.font_size, 24.0);
    }

    #[test]
    fn test_corrupt_file_is_a_settings_error() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join(SETTINGS_FILE_NAME), "not json").unwrap();

        let result = JsonSettingsStore::new(temp.path()).load();

        assert!(matches!(result, Err(AppError::Settings(_))));
    }

    #[test]
    fn test_in_memory_clones_share_values() {
        let settings = InMemorySettings::default();
        let other = settings.clone();

        other
            .save(&UserSettings {
                is_grid_layout: false,
                font_size: 14.0,
            })
            .unwrap();

        assert_eq!(settings.load().unwrap().font_size, 14.0);
        assert!(!settings.load().unwrap().is_grid_layout);
    }
}

//! Application state and initialization
//!
//! Opens the database in the application data directory and starts the
//! note store with file-backed settings and tokio-timer reminders.

use crate::config::{DATABASE_FILE_NAME, DATA_DIR_ENV};
use crate::database::{create_pool, Repository};
use crate::error::Result;
use crate::services::{JsonSettingsStore, ReminderFired, TokioReminderScheduler};
use crate::store::NoteStore;
use directories::ProjectDirs;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Everything a front end needs after startup
pub struct AppState {
    pub app_data_dir: PathBuf,
    pub store: NoteStore,
    /// Reminders as they come due
    pub reminders: mpsc::UnboundedReceiver<ReminderFired>,
}

impl AppState {
    /// Application setup - called once on startup
    pub async fn setup(app_data_dir: PathBuf) -> Result<Self> {
        tracing::info!("Initializing application");
        tracing::info!("App data directory: {:?}", app_data_dir);

        std::fs::create_dir_all(&app_data_dir)?;

        let pool = create_pool(&app_data_dir.join(DATABASE_FILE_NAME)).await?;
        let repo = Repository::new(pool);
        let settings = JsonSettingsStore::new(&app_data_dir);
        let (scheduler, reminders) = TokioReminderScheduler::new();

        let store = NoteStore::new(repo, Arc::new(settings), Arc::new(scheduler))?;

        tracing::info!("Application initialized successfully");

        Ok(Self {
            app_data_dir,
            store,
            reminders,
        })
    }
}

/// Data directory from the environment, else the platform default
pub fn default_data_dir() -> PathBuf {
    if let Some(dir) = std::env::var_os(DATA_DIR_ENV) {
        return PathBuf::from(dir);
    }

    ProjectDirs::from("", "", "notekeeper")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from(".notekeeper"))
}

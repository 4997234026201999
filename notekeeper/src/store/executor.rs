//! Command executor
//!
//! Runs the side effects behind each intent and reports the outcome as
//! reducer messages. Mutating handlers always finish by reloading every
//! list from the database instead of patching the previous state.

use super::intent::Intent;
use super::reducer::Msg;
use super::state::State;
use crate::config::{MAX_FONT_SIZE, MAX_PINNED_NOTES, MIN_FONT_SIZE, TRASH_RETENTION_DAYS};
use crate::database::{Note, RecordKind, Repository, Task};
use crate::error::{AppError, Result};
use crate::services::{ReminderScheduler, SettingsPort, UserSettings};
use chrono::{Duration, Utc};
use std::sync::Arc;

pub struct Executor {
    repo: Repository,
    settings: Arc<dyn SettingsPort>,
    reminders: Arc<dyn ReminderScheduler>,
}

impl Executor {
    pub fn new(
        repo: Repository,
        settings: Arc<dyn SettingsPort>,
        reminders: Arc<dyn ReminderScheduler>,
    ) -> Self {
        Self {
            repo,
            settings,
            reminders,
        }
    }

    /// Purge trash older than the retention window, then load everything
    pub async fn bootstrap(&self) -> Result<Vec<Msg>> {
        let cutoff = Utc::now() - Duration::days(TRASH_RETENTION_DAYS);

        let notes = self.repo.purge_older_than(RecordKind::Note, cutoff).await?;
        let tasks = self.repo.purge_older_than(RecordKind::Task, cutoff).await?;
        tracing::info!(
            "Bootstrap purged {} expired note(s) and {} expired task(s)",
            notes,
            tasks
        );

        self.reloaded().await
    }

    pub async fn execute(&self, intent: Intent, state: &State) -> Result<Vec<Msg>> {
        match intent {
            Intent::Load => self.reloaded().await,
            Intent::Add { title, text } => {
                self.repo.insert_note(&Note::new(title, text)).await?;
                self.reloaded().await
            }
            Intent::Update { id, title, text } => self.update_note(id, &title, &text).await,
            Intent::TogglePin { id } => self.toggle_pin(id).await,
            Intent::DismissPremiumDialog => Ok(vec![Msg::ShowPremiumDialog(false)]),
            Intent::MoveToTrash { id } => {
                let note = self.repo.get_note(id).await?;
                self.repo.update_note(&note.trashed(Utc::now())).await?;
                self.reloaded().await
            }
            Intent::Restore { id } => {
                let note = self.repo.get_note(id).await?;
                self.repo.update_note(&note.restored()).await?;
                self.reloaded().await
            }
            Intent::DeleteForever { id } => {
                self.repo.delete_note(id).await?;
                self.reloaded().await
            }
            Intent::ClearNotesTrash => {
                self.repo.purge_trash(RecordKind::Note).await?;
                self.reloaded().await
            }
            Intent::AddTask {
                text,
                reminder_time,
            } => self.add_task(text, reminder_time).await,
            Intent::UpdateTask {
                id,
                text,
                is_completed,
            } => {
                let task = self.repo.get_task(id).await?;
                self.repo
                    .update_task(&Task {
                        text,
                        is_completed,
                        ..task
                    })
                    .await?;
                self.reloaded().await
            }
            Intent::MoveTaskToTrash { id } => {
                let task = self.repo.get_task(id).await?;
                self.repo.update_task(&task.trashed(Utc::now())).await?;
                self.reloaded().await
            }
            Intent::RestoreTask { id } => {
                let task = self.repo.get_task(id).await?;
                self.repo.update_task(&task.restored()).await?;
                self.reloaded().await
            }
            Intent::DeleteTaskForever { id } => {
                self.repo.delete_task(id).await?;
                self.reloaded().await
            }
            Intent::ClearTasksTrash => {
                self.repo.purge_trash(RecordKind::Task).await?;
                self.reloaded().await
            }
            Intent::ToggleLayout => {
                let is_grid_layout = !state.is_grid_layout;
                self.persist_settings(UserSettings {
                    is_grid_layout,
                    ..state.settings()
                })
                .await?;
                Ok(vec![Msg::LayoutToggled(is_grid_layout)])
            }
            Intent::ChangeFontSize { size } => {
                if !size.is_finite() {
                    return Err(AppError::Settings(format!("Invalid font size: {}", size)));
                }
                let font_size = size.clamp(MIN_FONT_SIZE, MAX_FONT_SIZE);
                self.persist_settings(UserSettings {
                    font_size,
                    ..state.settings()
                })
                .await?;
                Ok(vec![Msg::FontSizeChanged(font_size)])
            }
            Intent::SelectTab { index } => Ok(vec![Msg::TabSelected(index)]),
            Intent::LoadHistory { note_id } => {
                let history = self.repo.list_history(note_id).await?;
                Ok(vec![Msg::HistoryLoaded(history)])
            }
            Intent::RestoreVersion { history_id } => self.restore_version(history_id).await,
        }
    }

    async fn load_all(&self) -> Result<Msg> {
        Ok(Msg::Loaded {
            notes: self.repo.list_active_notes().await?,
            trash_notes: self.repo.list_trash_notes().await?,
            tasks: self.repo.list_active_tasks().await?,
            trash_tasks: self.repo.list_trash_tasks().await?,
        })
    }

    async fn reloaded(&self) -> Result<Vec<Msg>> {
        Ok(vec![self.load_all().await?])
    }

    /// Writes history only when the title or text actually changes
    async fn update_note(&self, id: i64, title: &str, text: &str) -> Result<Vec<Msg>> {
        let note = self.repo.get_note(id).await?;

        if note.title != title || note.text != text {
            self.repo.revise_note(id, title, text).await?;
        } else {
            tracing::debug!("Note {} unchanged, skipping history snapshot", id);
        }

        self.reloaded().await
    }

    async fn toggle_pin(&self, id: i64) -> Result<Vec<Msg>> {
        let note = self.repo.get_note(id).await?;

        if !note.is_pinned && self.repo.count_pinned_notes().await? >= MAX_PINNED_NOTES {
            tracing::info!("Pin limit of {} reached, offering premium", MAX_PINNED_NOTES);
            return Ok(vec![Msg::ShowPremiumDialog(true)]);
        }

        self.repo
            .update_note(&Note {
                is_pinned: !note.is_pinned,
                ..note
            })
            .await?;
        self.reloaded().await
    }

    async fn add_task(
        &self,
        text: String,
        reminder_time: Option<chrono::DateTime<Utc>>,
    ) -> Result<Vec<Msg>> {
        let task = self.repo.insert_task(&Task::new(text, reminder_time)).await?;

        if let Some(fire_at) = task.reminder_time {
            if let Err(e) = self.reminders.schedule(&task.text, fire_at) {
                tracing::warn!("Failed to schedule reminder for task {}: {}", task.id, e);
            }
        }

        self.reloaded().await
    }

    /// Current values go to history first, so the restore can itself be undone
    async fn restore_version(&self, history_id: i64) -> Result<Vec<Msg>> {
        let entry = self.repo.get_history(history_id).await?;

        // Only active notes can be rolled back
        let note = self.repo.get_note(entry.note_id).await?;
        if note.is_deleted {
            return Err(AppError::NoteNotFound(note.id));
        }

        self.repo
            .revise_note(entry.note_id, &entry.title, &entry.text)
            .await?;

        let loaded = self.load_all().await?;
        let history = self.repo.list_history(entry.note_id).await?;
        Ok(vec![loaded, Msg::HistoryLoaded(history)])
    }

    async fn persist_settings(&self, settings: UserSettings) -> Result<()> {
        let port = Arc::clone(&self.settings);
        tokio::task::spawn_blocking(move || port.save(&settings))
            .await
            .map_err(|e| AppError::Settings(format!("Settings writer failed: {}", e)))?
    }
}

//! Intents: the closed set of requests a front end can send the store

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A user request. Notes, tasks and history entries are referenced by id
/// and re-read from the database, so a stale copy held by the caller can
/// never overwrite newer data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Intent {
    Load,
    Add {
        title: String,
        text: String,
    },
    Update {
        id: i64,
        title: String,
        text: String,
    },
    TogglePin {
        id: i64,
    },
    DismissPremiumDialog,
    MoveToTrash {
        id: i64,
    },
    Restore {
        id: i64,
    },
    DeleteForever {
        id: i64,
    },
    ClearNotesTrash,
    AddTask {
        text: String,
        #[serde(default)]
        reminder_time: Option<DateTime<Utc>>,
    },
    UpdateTask {
        id: i64,
        text: String,
        is_completed: bool,
    },
    MoveTaskToTrash {
        id: i64,
    },
    RestoreTask {
        id: i64,
    },
    DeleteTaskForever {
        id: i64,
    },
    ClearTasksTrash,
    ToggleLayout,
    ChangeFontSize {
        size: f32,
    },
    SelectTab {
        index: usize,
    },
    LoadHistory {
        note_id: i64,
    },
    RestoreVersion {
        history_id: i64,
    },
}

impl Intent {
    /// Short name for log lines; never includes note or task content
    pub fn name(&self) -> &'static str {
        match self {
            Intent::Load => "load",
            Intent::Add { .. } => "add",
            Intent::Update { .. } => "update",
            Intent::TogglePin { .. } => "toggle_pin",
            Intent::DismissPremiumDialog => "dismiss_premium_dialog",
            Intent::MoveToTrash { .. } => "move_to_trash",
            Intent::Restore { .. } => "restore",
            Intent::DeleteForever { .. } => "delete_forever",
            Intent::ClearNotesTrash => "clear_notes_trash",
            Intent::AddTask { .. } => "add_task",
            Intent::UpdateTask { .. } => "update_task",
            Intent::MoveTaskToTrash { .. } => "move_task_to_trash",
            Intent::RestoreTask { .. } => "restore_task",
            Intent::DeleteTaskForever { .. } => "delete_task_forever",
            Intent::ClearTasksTrash => "clear_tasks_trash",
            Intent::ToggleLayout => "toggle_layout",
            Intent::ChangeFontSize { .. } => "change_font_size",
            Intent::SelectTab { .. } => "select_tab",
            Intent::LoadHistory { .. } => "load_history",
            Intent::RestoreVersion { .. } => "restore_version",
        }
    }
}

//! Immutable state snapshot published by the note store

use crate::database::{Note, NoteHistoryEntry, Task};
use crate::services::UserSettings;
use serde::Serialize;

/// Everything a front end needs to render. Never mutated in place; the
/// reducer builds a new value for every change.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct State {
    /// Active notes, pinned first, newest first
    pub notes: Vec<Note>,
    pub trash_notes: Vec<Note>,
    /// Active tasks, newest first
    pub tasks: Vec<Task>,
    pub trash_tasks: Vec<Task>,
    /// History of the note currently being viewed, newest first
    pub note_history: Vec<NoteHistoryEntry>,
    pub is_grid_layout: bool,
    pub font_size: f32,
    pub show_premium_dialog: bool,
    pub selected_tab: usize,
}

impl State {
    /// Empty lists with display settings taken from the user's settings
    pub fn new(settings: UserSettings) -> Self {
        Self {
            notes: Vec::new(),
            trash_notes: Vec::new(),
            tasks: Vec::new(),
            trash_tasks: Vec::new(),
            note_history: Vec::new(),
            is_grid_layout: settings.is_grid_layout,
            font_size: settings.font_size,
            show_premium_dialog: false,
            selected_tab: 0,
        }
    }

    pub fn pinned_count(&self) -> usize {
        self.notes.iter().filter(|note| note.is_pinned).count()
    }

    /// Active notes whose title or text contains `query`, ignoring case.
    /// Keeps list order; an empty query matches everything.
    pub fn search_notes(&self, query: &str) -> Vec<&Note> {
        let needle = query.to_lowercase();
        self.notes
            .iter()
            .filter(|note| {
                needle.is_empty()
                    || note.title.to_lowercase().contains(&needle)
                    || note.text.to_lowercase().contains(&needle)
            })
            .collect()
    }

    /// Active tasks whose text contains `query`, ignoring case
    pub fn search_tasks(&self, query: &str) -> Vec<&Task> {
        let needle = query.to_lowercase();
        self.tasks
            .iter()
            .filter(|task| needle.is_empty() || task.text.to_lowercase().contains(&needle))
            .collect()
    }

    pub fn settings(&self) -> UserSettings {
        UserSettings {
            is_grid_layout: self.is_grid_layout,
            font_size: self.font_size,
        }
    }
}

impl Default for State {
    fn default() -> Self {
        Self::new(UserSettings::default())
    }
}

//! Database models
//!
//! Rust structs representing database entities.
//! All models use serde so a front end can render them directly.

use crate::config::TRASH_RETENTION_DAYS;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A short text note
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Note {
    pub id: i64,
    pub title: String,
    pub text: String,
    pub is_pinned: bool,
    pub is_deleted: bool,
    /// Set exactly when `is_deleted` is true
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Note {
    /// A fresh, unpinned note. The id is assigned on insert.
    pub fn new(title: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: 0,
            title: title.into(),
            text: text.into(),
            is_pinned: false,
            is_deleted: false,
            deleted_at: None,
        }
    }

    /// Copy of this note moved to the trash at `at`
    pub fn trashed(&self, at: DateTime<Utc>) -> Self {
        Self {
            is_deleted: true,
            deleted_at: Some(at),
            ..self.clone()
        }
    }

    /// Copy of this note taken back out of the trash
    pub fn restored(&self) -> Self {
        Self {
            is_deleted: false,
            deleted_at: None,
            ..self.clone()
        }
    }

    pub fn days_left(&self, now: DateTime<Utc>) -> i64 {
        days_left(self.deleted_at, now)
    }
}

/// A to-do item with an optional reminder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Task {
    pub id: i64,
    pub text: String,
    pub is_completed: bool,
    pub reminder_time: Option<DateTime<Utc>>,
    pub is_deleted: bool,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Task {
    /// A fresh, open task. The id is assigned on insert.
    pub fn new(text: impl Into<String>, reminder_time: Option<DateTime<Utc>>) -> Self {
        Self {
            id: 0,
            text: text.into(),
            is_completed: false,
            reminder_time,
            is_deleted: false,
            deleted_at: None,
        }
    }

    pub fn trashed(&self, at: DateTime<Utc>) -> Self {
        Self {
            is_deleted: true,
            deleted_at: Some(at),
            ..self.clone()
        }
    }

    pub fn restored(&self) -> Self {
        Self {
            is_deleted: false,
            deleted_at: None,
            ..self.clone()
        }
    }

    pub fn days_left(&self, now: DateTime<Utc>) -> i64 {
        days_left(self.deleted_at, now)
    }
}

/// Snapshot of a note's title and text taken right before an edit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct NoteHistoryEntry {
    pub history_id: i64,
    pub note_id: i64,
    pub title: String,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

/// Which record table a bulk trash operation applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    Note,
    Task,
}

impl RecordKind {
    pub fn table(self) -> &'static str {
        match self {
            RecordKind::Note => "notes",
            RecordKind::Task => "tasks",
        }
    }
}

/// Days remaining before a trashed record is purged.
///
/// Counts whole elapsed days only and never goes below zero. A record
/// without a deletion time reports the full retention window.
pub fn days_left(deleted_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> i64 {
    match deleted_at {
        None => TRASH_RETENTION_DAYS,
        Some(at) => {
            let elapsed = (now - at).num_days().max(0);
            (TRASH_RETENTION_DAYS - elapsed).max(0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_days_left_counts_whole_days() {
        let now = Utc::now();

        assert_eq!(days_left(Some(now), now), 30);
        assert_eq!(days_left(Some(now - Duration::hours(23)), now), 30);
        assert_eq!(days_left(Some(now - Duration::days(1)), now), 29);
        assert_eq!(days_left(Some(now - Duration::days(29) - Duration::hours(12)), now), 1);
    }

    #[test]
    fn test_days_left_never_negative() {
        let now = Utc::now();
        assert_eq!(days_left(Some(now - Duration::days(30)), now), 0);
        assert_eq!(days_left(Some(now - Duration::days(400)), now), 0);
    }

    #[test]
    fn test_days_left_without_deletion_time() {
        assert_eq!(days_left(None, Utc::now()), TRASH_RETENTION_DAYS);
    }

    #[test]
    fn test_trash_and_restore_keep_invariant() {
        let now = Utc::now();
        let note = Note::new("Title", "Body");

        let trashed = note.trashed(now);
        assert!(trashed.is_deleted);
        assert_eq!(trashed.deleted_at, Some(now));
        assert_eq!(trashed.title, "Title");

        let restored = trashed.restored();
        assert!(!restored.is_deleted);
        assert!(restored.deleted_at.is_none());

        let task = Task::new("Call mom", None).trashed(now);
        assert_eq!(task.is_deleted, task.deleted_at.is_some());
        assert_eq!(task.days_left(now), 30);
    }
}

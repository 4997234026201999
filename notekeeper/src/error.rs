//! Error types for the notekeeper core
//!
//! All errors use thiserror for structured error handling.
//! These errors can be serialized to a front end as plain strings.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Note not found: {0}")]
    NoteNotFound(i64),

    #[error("Task not found: {0}")]
    TaskNotFound(i64),

    #[error("History entry not found: {0}")]
    HistoryNotFound(i64),

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("Reminder error: {0}")]
    Reminder(String),

    #[error("Note store is closed")]
    StoreClosed,

    #[error("{0}")]
    Generic(String),
}

impl serde::Serialize for AppError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

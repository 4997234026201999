//! Repository layer for database operations
//!
//! CRUD over notes, tasks and note history. Multi-statement operations
//! run in a transaction so history never outlives its note and an edit
//! is never recorded without being applied.

use super::models::*;
use crate::error::{AppError, Result};
use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};

/// Repository for database operations
#[derive(Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // ===== Notes =====

    /// List non-deleted notes, pinned first, newest first
    pub async fn list_active_notes(&self) -> Result<Vec<Note>> {
        let notes = sqlx::query_as::<_, Note>(
            r#"
            SELECT * FROM notes
            WHERE is_deleted = 0
            ORDER BY is_pinned DESC, id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(notes)
    }

    /// List notes in the trash
    pub async fn list_trash_notes(&self) -> Result<Vec<Note>> {
        let notes = sqlx::query_as::<_, Note>(
            r#"
            SELECT * FROM notes WHERE is_deleted = 1 ORDER BY id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(notes)
    }

    /// Get a note by ID, trashed or not
    pub async fn get_note(&self, id: i64) -> Result<Note> {
        sqlx::query_as::<_, Note>("SELECT * FROM notes WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(AppError::NoteNotFound(id))
    }

    /// Insert a note under a freshly assigned id
    pub async fn insert_note(&self, note: &Note) -> Result<Note> {
        let created = sqlx::query_as::<_, Note>(
            r#"
            INSERT INTO notes (title, text, is_pinned, is_deleted, deleted_at)
            VALUES (?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(&note.title)
        .bind(&note.text)
        .bind(note.is_pinned)
        .bind(note.is_deleted)
        .bind(note.deleted_at)
        .fetch_one(&self.pool)
        .await?;

        tracing::debug!("Created note: {}", created.id);
        Ok(created)
    }

    /// Replace every column of the note with the given id
    pub async fn update_note(&self, note: &Note) -> Result<Note> {
        let updated = sqlx::query_as::<_, Note>(
            r#"
            UPDATE notes
            SET title = ?, text = ?, is_pinned = ?, is_deleted = ?, deleted_at = ?
            WHERE id = ?
            RETURNING *
            "#,
        )
        .bind(&note.title)
        .bind(&note.text)
        .bind(note.is_pinned)
        .bind(note.is_deleted)
        .bind(note.deleted_at)
        .bind(note.id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(AppError::NoteNotFound(note.id))?;

        tracing::debug!("Updated note: {}", note.id);
        Ok(updated)
    }

    /// Permanently delete a note together with its history
    pub async fn delete_note(&self, id: i64) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM note_history WHERE note_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let rows = sqlx::query("DELETE FROM notes WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        if rows == 0 {
            return Err(AppError::NoteNotFound(id));
        }

        tx.commit().await?;

        tracing::debug!("Hard deleted note: {}", id);
        Ok(())
    }

    /// Number of active pinned notes
    pub async fn count_pinned_notes(&self) -> Result<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM notes WHERE is_deleted = 0 AND is_pinned = 1")
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }

    /// Snapshot the stored title and text into history, then overwrite them.
    ///
    /// Both writes commit together. Returns the updated note.
    pub async fn revise_note(&self, id: i64, title: &str, text: &str) -> Result<Note> {
        let mut tx = self.pool.begin().await?;

        let current = sqlx::query_as::<_, Note>("SELECT * FROM notes WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(AppError::NoteNotFound(id))?;

        insert_history_on(&mut tx, id, &current.title, &current.text).await?;

        let revised = sqlx::query_as::<_, Note>(
            "UPDATE notes SET title = ?, text = ? WHERE id = ? RETURNING *",
        )
        .bind(title)
        .bind(text)
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::debug!("Revised note {} with history snapshot", id);
        Ok(revised)
    }

    // ===== Tasks =====

    /// List non-deleted tasks, newest first
    pub async fn list_active_tasks(&self) -> Result<Vec<Task>> {
        let tasks = sqlx::query_as::<_, Task>(
            r#"
            SELECT * FROM tasks WHERE is_deleted = 0 ORDER BY id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(tasks)
    }

    /// List tasks in the trash
    pub async fn list_trash_tasks(&self) -> Result<Vec<Task>> {
        let tasks = sqlx::query_as::<_, Task>(
            r#"
            SELECT * FROM tasks WHERE is_deleted = 1 ORDER BY id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(tasks)
    }

    pub async fn get_task(&self, id: i64) -> Result<Task> {
        sqlx::query_as::<_, Task>("SELECT * FROM tasks WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(AppError::TaskNotFound(id))
    }

    pub async fn insert_task(&self, task: &Task) -> Result<Task> {
        let created = sqlx::query_as::<_, Task>(
            r#"
            INSERT INTO tasks (text, is_completed, reminder_time, is_deleted, deleted_at)
            VALUES (?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(&task.text)
        .bind(task.is_completed)
        .bind(task.reminder_time)
        .bind(task.is_deleted)
        .bind(task.deleted_at)
        .fetch_one(&self.pool)
        .await?;

        tracing::debug!("Created task: {}", created.id);
        Ok(created)
    }

    pub async fn update_task(&self, task: &Task) -> Result<Task> {
        let updated = sqlx::query_as::<_, Task>(
            r#"
            UPDATE tasks
            SET text = ?, is_completed = ?, reminder_time = ?, is_deleted = ?, deleted_at = ?
            WHERE id = ?
            RETURNING *
            "#,
        )
        .bind(&task.text)
        .bind(task.is_completed)
        .bind(task.reminder_time)
        .bind(task.is_deleted)
        .bind(task.deleted_at)
        .bind(task.id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(AppError::TaskNotFound(task.id))?;

        tracing::debug!("Updated task: {}", task.id);
        Ok(updated)
    }

    pub async fn delete_task(&self, id: i64) -> Result<()> {
        let rows = sqlx::query("DELETE FROM tasks WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        if rows == 0 {
            return Err(AppError::TaskNotFound(id));
        }

        tracing::debug!("Hard deleted task: {}", id);
        Ok(())
    }

    // ===== Trash =====

    /// Permanently remove every trashed row of `kind`. Returns rows removed.
    pub async fn purge_trash(&self, kind: RecordKind) -> Result<u64> {
        let mut tx = self.pool.begin().await?;

        if kind == RecordKind::Note {
            sqlx::query(
                "DELETE FROM note_history WHERE note_id IN (SELECT id FROM notes WHERE is_deleted = 1)",
            )
            .execute(&mut *tx)
            .await?;
        }

        let rows = sqlx::query(&format!("DELETE FROM {} WHERE is_deleted = 1", kind.table()))
            .execute(&mut *tx)
            .await?
            .rows_affected();

        tx.commit().await?;

        tracing::info!("Cleared {} trashed row(s) from {}", rows, kind.table());
        Ok(rows)
    }

    /// Permanently remove trashed rows of `kind` deleted before `cutoff`
    pub async fn purge_older_than(&self, kind: RecordKind, cutoff: DateTime<Utc>) -> Result<u64> {
        let table = kind.table();
        let expired = format!(
            "SELECT id FROM {table} WHERE is_deleted = 1 AND deleted_at IS NOT NULL \
             AND julianday(deleted_at) < julianday(?)"
        );

        let mut tx = self.pool.begin().await?;

        if kind == RecordKind::Note {
            sqlx::query(&format!(
                "DELETE FROM note_history WHERE note_id IN ({expired})"
            ))
            .bind(cutoff)
            .execute(&mut *tx)
            .await?;
        }

        let rows = sqlx::query(&format!("DELETE FROM {table} WHERE id IN ({expired})"))
            .bind(cutoff)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        tx.commit().await?;

        if rows > 0 {
            tracing::info!("Purged {} expired row(s) from {}", rows, table);
        }
        Ok(rows)
    }

    // ===== Note history =====

    /// Record a snapshot of a note's title and text
    pub async fn insert_history(
        &self,
        note_id: i64,
        title: &str,
        text: &str,
    ) -> Result<NoteHistoryEntry> {
        let mut conn = self.pool.acquire().await?;
        insert_history_on(&mut conn, note_id, title, text).await
    }

    pub async fn get_history(&self, history_id: i64) -> Result<NoteHistoryEntry> {
        sqlx::query_as::<_, NoteHistoryEntry>("SELECT * FROM note_history WHERE history_id = ?")
            .bind(history_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(AppError::HistoryNotFound(history_id))
    }

    /// History of a note, newest first
    pub async fn list_history(&self, note_id: i64) -> Result<Vec<NoteHistoryEntry>> {
        let history = sqlx::query_as::<_, NoteHistoryEntry>(
            r#"
            SELECT * FROM note_history
            WHERE note_id = ?
            ORDER BY julianday(timestamp) DESC, history_id DESC
            "#,
        )
        .bind(note_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(history)
    }

    pub async fn delete_history(&self, note_id: i64) -> Result<u64> {
        let rows = sqlx::query("DELETE FROM note_history WHERE note_id = ?")
            .bind(note_id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        tracing::debug!("Deleted {} history entries for note: {}", rows, note_id);
        Ok(rows)
    }
}

async fn insert_history_on(
    conn: &mut SqliteConnection,
    note_id: i64,
    title: &str,
    text: &str,
) -> Result<NoteHistoryEntry> {
    let entry = sqlx::query_as::<_, NoteHistoryEntry>(
        r#"
        INSERT INTO note_history (note_id, title, text, timestamp)
        VALUES (?, ?, ?, ?)
        RETURNING *
        "#,
    )
    .bind(note_id)
    .bind(title)
    .bind(text)
    .bind(Utc::now())
    .fetch_one(&mut *conn)
    .await?;

    tracing::debug!("Recorded history {} for note: {}", entry.history_id, note_id);
    Ok(entry)
}

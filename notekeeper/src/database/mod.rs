//! Database module
//!
//! This module provides all database functionality including:
//! - Schema and migrations
//! - Model definitions
//! - Repository layer for notes, tasks and note history

pub mod models;
pub mod repository;
pub mod schema;

pub use models::*;
pub use repository::Repository;
pub use schema::initialize_database;

use crate::error::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use std::time::Duration;

/// Connections the store's worker and read-only callers share
const POOL_CONNECTIONS: u32 = 4;

/// Open a pool on `db_path` with WAL journaling and foreign keys enforced.
/// Foreign keys are per connection in SQLite, so every pooled connection
/// gets them from these options.
async fn open_pool(db_path: &Path, max_connections: u32) -> Result<SqlitePool> {
    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .foreign_keys(true)
        .busy_timeout(Duration::from_secs(5));

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await?;
    Ok(pool)
}

/// Open the notes database, bringing its schema up to date first.
///
/// The schema is migrated over a single connection that is closed again
/// before the shared pool opens.
pub async fn create_pool(db_path: &Path) -> Result<SqlitePool> {
    tracing::info!("Opening notes database at {:?}", db_path);

    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let migrator = open_pool(db_path, 1).await?;
    initialize_database(&migrator).await?;
    migrator.close().await;

    let pool = open_pool(db_path, POOL_CONNECTIONS).await?;
    tracing::debug!("Notes database ready with {} connection(s)", POOL_CONNECTIONS);

    Ok(pool)
}

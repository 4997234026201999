//! Application configuration constants
//!
//! Central location for retention windows, limits, defaults and file
//! names used throughout the application.

// ===== Trash =====

/// Days a soft-deleted note or task stays in the trash before it is purged
pub const TRASH_RETENTION_DAYS: i64 = 30;

// ===== Pinning =====

/// Maximum number of active pinned notes on the free tier.
/// Pinning beyond this raises the premium dialog instead.
pub const MAX_PINNED_NOTES: i64 = 5;

// ===== User Settings =====

/// Grid layout is the default note list presentation
pub const DEFAULT_GRID_LAYOUT: bool = true;

/// Default note body font size in points
pub const DEFAULT_FONT_SIZE: f32 = 16.0;

/// Smallest font size the settings sheet offers
pub const MIN_FONT_SIZE: f32 = 12.0;

/// Largest font size the settings sheet offers
pub const MAX_FONT_SIZE: f32 = 32.0;

// ===== Store =====

/// Number of state snapshots buffered per observer.
/// Observers further behind skip the oldest snapshots.
pub const STATE_CHANNEL_CAPACITY: usize = 64;

// ===== Files =====

/// Environment variable overriding the application data directory
pub const DATA_DIR_ENV: &str = "NOTEKEEPER_DATA_DIR";

/// SQLite database file name inside the data directory
pub const DATABASE_FILE_NAME: &str = "notekeeper.db";

/// User settings file name inside the data directory
pub const SETTINGS_FILE_NAME: &str = "settings.json";

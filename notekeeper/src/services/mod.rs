//! Services module
//!
//! Ports the note store talks to outside its database: user settings
//! and reminder scheduling.

pub mod reminders;
pub mod settings;

pub use reminders::{ReminderFired, ReminderScheduler, TokioReminderScheduler};
pub use settings::{InMemorySettings, JsonSettingsStore, SettingsPort, UserSettings};

//! notekeeper library
//!
//! Notes and tasks with a 30-day trash and per-note edit history, served
//! through a single-writer state store. A front end sends `Intent`s to
//! the `NoteStore` and renders the `State` snapshots it publishes.

pub mod app;
pub mod config;
pub mod database;
pub mod error;
pub mod services;
pub mod store;

pub use error::{AppError, Result};
pub use store::{Intent, NoteStore, State, StateSubscription};

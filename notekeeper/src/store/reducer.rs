//! Reducer: folds executor messages into the next state

use super::state::State;
use crate::database::{Note, NoteHistoryEntry, Task};

/// Internal update produced by the executor
#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    Loaded {
        notes: Vec<Note>,
        trash_notes: Vec<Note>,
        tasks: Vec<Task>,
        trash_tasks: Vec<Task>,
    },
    ShowPremiumDialog(bool),
    LayoutToggled(bool),
    FontSizeChanged(f32),
    TabSelected(usize),
    HistoryLoaded(Vec<NoteHistoryEntry>),
}

/// Next state after `msg`. Only the fields the message carries change.
pub fn reduce(state: &State, msg: Msg) -> State {
    match msg {
        Msg::Loaded {
            notes,
            trash_notes,
            tasks,
            trash_tasks,
        } => State {
            notes,
            trash_notes,
            tasks,
            trash_tasks,
            ..state.clone()
        },
        Msg::ShowPremiumDialog(show) => State {
            show_premium_dialog: show,
            ..state.clone()
        },
        Msg::LayoutToggled(is_grid_layout) => State {
            is_grid_layout,
            ..state.clone()
        },
        Msg::FontSizeChanged(font_size) => State {
            font_size,
            ..state.clone()
        },
        Msg::TabSelected(selected_tab) => State {
            selected_tab,
            ..state.clone()
        },
        Msg::HistoryLoaded(note_history) => State {
            note_history,
            ..state.clone()
        },
    }
}

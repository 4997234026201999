//! Note store
//!
//! Single-writer state container. Intents are queued on one channel and
//! handled one at a time by a background worker, which runs the executor,
//! folds the resulting messages through the reducer and publishes every
//! new state to observers in order.

pub mod executor;
pub mod intent;
pub mod reducer;
pub mod state;

pub use executor::Executor;
pub use intent::Intent;
pub use reducer::{reduce, Msg};
pub use state::State;

use crate::config::STATE_CHANNEL_CAPACITY;
use crate::database::Repository;
use crate::error::{AppError, Result};
use crate::services::{ReminderScheduler, SettingsPort};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::task::JoinHandle;

type Reply = oneshot::Sender<Result<Arc<State>>>;

struct Command {
    intent: Intent,
    reply: Option<Reply>,
}

/// Handle to a running note store
pub struct NoteStore {
    commands: mpsc::UnboundedSender<Command>,
    publisher: Arc<Publisher>,
    worker: JoinHandle<()>,
}

impl NoteStore {
    /// Start a store. Reads the user settings once, then spawns the worker,
    /// which purges expired trash and loads every list before handling
    /// any intent. Must be called from within a Tokio runtime.
    pub fn new(
        repo: Repository,
        settings: Arc<dyn SettingsPort>,
        reminders: Arc<dyn ReminderScheduler>,
    ) -> Result<Self> {
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| AppError::Generic(format!("No async runtime available: {}", e)))?;

        let initial = State::new(settings.load()?);
        let publisher = Arc::new(Publisher::new(initial));
        let executor = Executor::new(repo, settings, reminders);
        let (commands, receiver) = mpsc::unbounded_channel();

        let worker = runtime.spawn(run_worker(executor, Arc::clone(&publisher), receiver));

        tracing::info!("Note store started");

        Ok(Self {
            commands,
            publisher,
            worker,
        })
    }

    /// Queue an intent without waiting for it
    pub fn accept(&self, intent: Intent) -> Result<()> {
        self.commands
            .send(Command {
                intent,
                reply: None,
            })
            .map_err(|_| AppError::StoreClosed)
    }

    /// Queue an intent and wait for it to finish.
    ///
    /// Returns the state published after the intent, or the error that
    /// stopped it. A failed intent publishes nothing.
    pub async fn execute(&self, intent: Intent) -> Result<Arc<State>> {
        let (reply, outcome) = oneshot::channel();
        self.commands
            .send(Command {
                intent,
                reply: Some(reply),
            })
            .map_err(|_| AppError::StoreClosed)?;

        outcome.await.map_err(|_| AppError::StoreClosed)?
    }

    /// Latest published state
    pub fn state(&self) -> Arc<State> {
        self.publisher.current()
    }

    /// Subscribe to state changes, starting with the current state
    pub fn observe(&self) -> StateSubscription {
        self.publisher.subscribe()
    }

    /// Stop accepting intents, finish the queued ones and wait for the worker
    pub async fn shutdown(self) {
        let NoteStore {
            commands, worker, ..
        } = self;
        drop(commands);

        if let Err(e) = worker.await {
            tracing::error!("Note store worker ended abnormally: {}", e);
        }
        tracing::info!("Note store stopped");
    }
}

/// Ordered stream of states handed out by [`NoteStore::observe`]
pub struct StateSubscription {
    pending: Option<Arc<State>>,
    updates: broadcast::Receiver<Arc<State>>,
}

impl StateSubscription {
    /// Next state, or `None` once the store is gone and everything was seen.
    ///
    /// A subscriber that falls behind by more than the channel capacity
    /// skips the oldest states but never sees them out of order.
    pub async fn next(&mut self) -> Option<Arc<State>> {
        if let Some(state) = self.pending.take() {
            return Some(state);
        }

        loop {
            match self.updates.recv().await {
                Ok(state) => return Some(state),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!("State observer lagged, skipped {} state(s)", skipped);
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }
}

/// Latest state plus fan-out. Both change under one lock so a new
/// subscriber never misses or repeats a state.
struct Publisher {
    latest: Mutex<Arc<State>>,
    updates: broadcast::Sender<Arc<State>>,
}

impl Publisher {
    fn new(initial: State) -> Self {
        let (updates, _) = broadcast::channel(STATE_CHANNEL_CAPACITY);
        Self {
            latest: Mutex::new(Arc::new(initial)),
            updates,
        }
    }

    fn current(&self) -> Arc<State> {
        Arc::clone(&self.latest.lock().unwrap_or_else(PoisonError::into_inner))
    }

    fn subscribe(&self) -> StateSubscription {
        let latest = self.latest.lock().unwrap_or_else(PoisonError::into_inner);
        StateSubscription {
            pending: Some(Arc::clone(&latest)),
            updates: self.updates.subscribe(),
        }
    }

    fn publish(&self, state: State) -> Arc<State> {
        let state = Arc::new(state);
        let mut latest = self.latest.lock().unwrap_or_else(PoisonError::into_inner);
        *latest = Arc::clone(&state);
        // No subscribers is fine
        let _ = self.updates.send(Arc::clone(&state));
        state
    }

    /// Fold messages into `state`, publishing after each one
    fn apply(&self, mut state: Arc<State>, msgs: Vec<Msg>) -> Arc<State> {
        for msg in msgs {
            state = self.publish(reduce(&state, msg));
        }
        state
    }
}

async fn run_worker(
    executor: Executor,
    publisher: Arc<Publisher>,
    mut commands: mpsc::UnboundedReceiver<Command>,
) {
    let mut state = publisher.current();

    match executor.bootstrap().await {
        Ok(msgs) => state = publisher.apply(state, msgs),
        Err(e) => tracing::error!("Note store bootstrap failed: {}", e),
    }

    while let Some(Command { intent, reply }) = commands.recv().await {
        let name = intent.name();
        tracing::debug!("Handling intent: {}", name);

        let result = match executor.execute(intent, &state).await {
            Ok(msgs) => {
                state = publisher.apply(Arc::clone(&state), msgs);
                Ok(Arc::clone(&state))
            }
            Err(e) => {
                log_failure(name, &e);
                Err(e)
            }
        };

        if let Some(reply) = reply {
            // The caller may have stopped waiting
            let _ = reply.send(result);
        }
    }

    tracing::debug!("Note store queue closed");
}

fn log_failure(intent: &str, error: &AppError) {
    match error {
        AppError::NoteNotFound(_) | AppError::TaskNotFound(_) | AppError::HistoryNotFound(_) => {
            tracing::warn!("Intent {} abandoned: {}", intent, error)
        }
        _ => tracing::error!("Intent {} failed: {}", intent, error),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::initialize_database;
    use crate::services::{InMemorySettings, UserSettings};
    use chrono::{DateTime, Duration, Utc};
    use sqlx::sqlite::SqlitePoolOptions;
    use std::sync::Mutex as StdMutex;

    #[derive(Default)]
    struct RecordingReminders {
        scheduled: StdMutex<Vec<(String, DateTime<Utc>)>>,
    }

    impl ReminderScheduler for RecordingReminders {
        fn schedule(&self, message: &str, fire_at: DateTime<Utc>) -> Result<()> {
            self.scheduled
                .lock()
                .unwrap()
                .push((message.to_string(), fire_at));
            Ok(())
        }
    }

    async fn test_repo() -> Repository {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        initialize_database(&pool).await.unwrap();
        Repository::new(pool)
    }

    fn start(repo: Repository, settings: InMemorySettings) -> (NoteStore, Arc<RecordingReminders>) {
        let reminders = Arc::new(RecordingReminders::default());
        let store = NoteStore::new(repo, Arc::new(settings), reminders.clone()).unwrap();
        (store, reminders)
    }

    fn add(title: &str, text: &str) -> Intent {
        Intent::Add {
            title: title.to_string(),
            text: text.to_string(),
        }
    }

    #[tokio::test]
    async fn test_initial_state_comes_from_settings() {
        let settings = InMemorySettings::new(UserSettings {
            is_grid_layout: false,
            font_size: 18.0,
        });
        let (store, _) = start(test_repo().await, settings);

        let state = store.state();
        assert!(!state.is_grid_layout);
        assert_eq!(state.font_size, 18.0);

        store.shutdown().await;
    }

    #[tokio::test]
    async fn test_shopping_scenario() {
        let (store, _) = start(test_repo().await, InMemorySettings::default());

        let state = store.execute(add("Shopping", "Milk, eggs")).await.unwrap();
        assert_eq!(state.notes.len(), 1);
        assert_eq!(state.notes[0].title, "Shopping");
        let id = state.notes[0].id;

        let state = store.execute(Intent::MoveToTrash { id }).await.unwrap();
        assert!(state.notes.is_empty());
        assert_eq!(state.trash_notes.len(), 1);
        assert!(state.trash_notes[0].deleted_at.is_some());
        assert_eq!(state.trash_notes[0].days_left(Utc::now()), 30);

        let state = store.execute(Intent::ClearNotesTrash).await.unwrap();
        assert!(state.trash_notes.is_empty());

        let gone = store.execute(Intent::Restore { id }).await;
        assert!(matches!(gone, Err(AppError::NoteNotFound(_))));

        store.shutdown().await;
    }

    #[tokio::test]
    async fn test_failed_intent_publishes_nothing() {
        let (store, _) = start(test_repo().await, InMemorySettings::default());
        let before = store.execute(Intent::Load).await.unwrap();

        let result = store.execute(Intent::TogglePin { id: 77 }).await;

        assert!(matches!(result, Err(AppError::NoteNotFound(77))));
        assert!(Arc::ptr_eq(&before, &store.state()));

        store.shutdown().await;
    }

    #[tokio::test]
    async fn test_observer_sees_every_state_in_order() {
        let (store, _) = start(test_repo().await, InMemorySettings::default());
        store.execute(Intent::Load).await.unwrap();

        let mut states = store.observe();
        let first = states.next().await.unwrap();
        assert!(first.notes.is_empty());

        for i in 0..3 {
            store.accept(add(&format!("Note {}", i), "")).unwrap();
        }
        store.accept(Intent::SelectTab { index: 1 }).unwrap();

        for expected in 1..=3 {
            let state = states.next().await.unwrap();
            assert_eq!(state.notes.len(), expected);
        }
        let tabbed = states.next().await.unwrap();
        assert_eq!(tabbed.selected_tab, 1);
        assert_eq!(tabbed.notes.len(), 3);

        store.shutdown().await;
        assert!(states.next().await.is_none());
    }

    #[tokio::test]
    async fn test_lagging_observer_skips_oldest_states_in_order() {
        let (store, _) = start(test_repo().await, InMemorySettings::default());
        store.execute(Intent::Load).await.unwrap();

        let mut states = store.observe();
        let total = STATE_CHANNEL_CAPACITY + 86;
        for index in 1..=total {
            store.accept(Intent::SelectTab { index }).unwrap();
        }
        store.shutdown().await;

        let mut seen = Vec::new();
        while let Some(state) = states.next().await {
            seen.push(state.selected_tab);
        }

        assert_eq!(seen[0], 0);
        assert!(seen.windows(2).all(|pair| pair[0] < pair[1]));
        assert_eq!(seen.last(), Some(&total));
        assert!(seen.len() <= STATE_CHANNEL_CAPACITY + 1);
    }

    #[tokio::test]
    async fn test_bootstrap_failure_keeps_store_serving() {
        // No schema, so the startup purge fails
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        let (store, _) = start(Repository::new(pool), InMemorySettings::default());

        let load = store.execute(Intent::Load).await;
        assert!(matches!(load, Err(AppError::Database(_))));

        let state = store.execute(Intent::SelectTab { index: 2 }).await.unwrap();
        assert_eq!(state.selected_tab, 2);
        assert!(state.notes.is_empty());

        store.shutdown().await;
    }

    #[tokio::test]
    async fn test_queued_intents_run_in_order() {
        let (store, _) = start(test_repo().await, InMemorySettings::default());

        store.accept(add("Draft", "v1")).unwrap();
        let state = store.execute(Intent::Load).await.unwrap();
        let id = state.notes[0].id;

        for version in 2..=4 {
            store
                .accept(Intent::Update {
                    id,
                    title: "Draft".to_string(),
                    text: format!("v{}", version),
                })
                .unwrap();
        }
        store.accept(Intent::LoadHistory { note_id: id }).unwrap();
        let state = store.execute(Intent::Load).await.unwrap();

        assert_eq!(state.notes[0].text, "v4");
        let texts: Vec<&str> = state.note_history.iter().map(|h| h.text.as_str()).collect();
        assert_eq!(texts, vec!["v3", "v2", "v1"]);

        store.shutdown().await;
    }

    #[tokio::test]
    async fn test_task_lifecycle_and_reminder() {
        let (store, reminders) = start(test_repo().await, InMemorySettings::default());
        let fire_at = Utc::now() + Duration::hours(3);

        store
            .execute(Intent::AddTask {
                text: "Plain".to_string(),
                reminder_time: None,
            })
            .await
            .unwrap();
        let state = store
            .execute(Intent::AddTask {
                text: "Call dentist".to_string(),
                reminder_time: Some(fire_at),
            })
            .await
            .unwrap();

        {
            let scheduled = reminders.scheduled.lock().unwrap();
            assert_eq!(scheduled.len(), 1);
            assert_eq!(scheduled[0].0, "Call dentist");
        }
        assert_eq!(state.tasks[0].text, "Call dentist");
        let id = state.tasks[0].id;

        let state = store
            .execute(Intent::UpdateTask {
                id,
                text: "Call dentist".to_string(),
                is_completed: true,
            })
            .await
            .unwrap();
        assert!(state.tasks[0].is_completed);
        assert!(state.tasks[0].reminder_time.is_some());

        let state = store.execute(Intent::MoveTaskToTrash { id }).await.unwrap();
        assert_eq!(state.tasks.len(), 1);
        assert_eq!(state.trash_tasks.len(), 1);
        assert!(state.trash_tasks[0].deleted_at.is_some());

        let state = store.execute(Intent::RestoreTask { id }).await.unwrap();
        assert_eq!(state.tasks.len(), 2);
        assert!(state.tasks.iter().all(|t| t.deleted_at.is_none()));

        let state = store
            .execute(Intent::DeleteTaskForever { id })
            .await
            .unwrap();
        assert_eq!(state.tasks.len(), 1);
        assert_eq!(reminders.scheduled.lock().unwrap().len(), 1);

        store.shutdown().await;
    }

    #[tokio::test]
    async fn test_accept_after_worker_stops_is_store_closed() {
        let (mut store, _) = start(test_repo().await, InMemorySettings::default());
        store.worker.abort();
        let _ = (&mut store.worker).await;

        let result = store.accept(Intent::Load);

        assert!(matches!(result, Err(AppError::StoreClosed)));
    }
}

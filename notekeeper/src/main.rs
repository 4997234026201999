// notekeeper - headless driver for the note store
// Reads one JSON intent per line on stdin and writes every published
// state as one JSON line on stdout. Logs go to stderr.

use notekeeper::app::{default_data_dir, AppState};
use notekeeper::Intent;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "notekeeper=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::info!("Starting notekeeper");

    let data_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(default_data_dir);

    let AppState {
        store,
        mut reminders,
        ..
    } = AppState::setup(data_dir).await?;

    let mut states = store.observe();
    let printer = tokio::spawn(async move {
        while let Some(state) = states.next().await {
            match serde_json::to_string(&*state) {
                Ok(line) => println!("{}", line),
                Err(e) => tracing::error!("Failed to serialize state: {}", e),
            }
        }
    });

    let notifier = tokio::spawn(async move {
        while let Some(reminder) = reminders.recv().await {
            tracing::info!("Reminder: {} (due {})", reminder.message, reminder.fire_at);
        }
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        let intent: Intent = match serde_json::from_str(&line) {
            Ok(intent) => intent,
            Err(e) => {
                tracing::warn!("Ignoring malformed intent: {}", e);
                continue;
            }
        };

        if let Err(e) = store.execute(intent).await {
            eprintln!("{}", serde_json::json!({ "error": e }));
        }
    }

    store.shutdown().await;
    printer.await?;
    notifier.abort();

    tracing::info!("notekeeper finished");
    Ok(())
}

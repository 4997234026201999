//! Reminders service
//!
//! One-shot task reminders. Each scheduled reminder runs as its own
//! background timer and is delivered on a channel when due; the OS
//! notification itself is left to whoever drains that channel.

use crate::error::{AppError, Result};
use chrono::{DateTime, Utc};
use tokio::sync::mpsc;

/// A reminder whose time has come
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ReminderFired {
    pub message: String,
    pub fire_at: DateTime<Utc>,
}

/// Schedules exactly one future notification per call
pub trait ReminderScheduler: Send + Sync {
    fn schedule(&self, message: &str, fire_at: DateTime<Utc>) -> Result<()>;
}

/// Reminder scheduler backed by tokio timers
#[derive(Clone)]
pub struct TokioReminderScheduler {
    sender: mpsc::UnboundedSender<ReminderFired>,
}

impl TokioReminderScheduler {
    /// Create the scheduler and the receiving end fired reminders arrive on
    pub fn new() -> (Self, mpsc::UnboundedReceiver<ReminderFired>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl ReminderScheduler for TokioReminderScheduler {
    fn schedule(&self, message: &str, fire_at: DateTime<Utc>) -> Result<()> {
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| AppError::Reminder(format!("No async runtime available: {}", e)))?;

        if self.sender.is_closed() {
            return Err(AppError::Reminder("Reminder receiver was dropped".to_string()));
        }

        // Past reminders fire right away
        let delay = (fire_at - Utc::now()).to_std().unwrap_or_default();
        let sender = self.sender.clone();
        let event = ReminderFired {
            message: message.to_string(),
            fire_at,
        };

        tracing::info!("Scheduling reminder at {} ({:?} from now)", fire_at, delay);

        runtime.spawn(async move {
            tokio::time::sleep(delay).await;

            tracing::info!("Reminder due: {}", event.message);
            if sender.send(event).is_err() {
                tracing::warn!("Reminder fired after its receiver was dropped");
            }
        });

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use std::time::Duration as StdDuration;

    #[tokio::test]
    async fn test_past_reminder_fires_immediately() {
        let (scheduler, mut fired) = TokioReminderScheduler::new();
        let fire_at = Utc::now() - Duration::minutes(5);

        scheduler.schedule("Water plants", fire_at).unwrap();

        let event = tokio::time::timeout(StdDuration::from_secs(1), fired.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(event.message, "Water plants");
        assert_eq!(event.fire_at, fire_at);
    }

    #[tokio::test]
    async fn test_future_reminder_waits_until_due() {
        let (scheduler, mut fired) = TokioReminderScheduler::new();

        scheduler
            .schedule("Stand up", Utc::now() + Duration::milliseconds(200))
            .unwrap();

        assert!(fired.try_recv().is_err());

        let event = tokio::time::timeout(StdDuration::from_secs(2), fired.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(event.message, "Stand up");
    }

    #[tokio::test]
    async fn test_schedule_fails_without_receiver() {
        let (scheduler, fired) = TokioReminderScheduler::new();
        drop(fired);

        let result = scheduler.schedule("Nobody listens", Utc::now());

        assert!(matches!(result, Err(AppError::Reminder(_))));
    }

    #[test]
    fn test_schedule_fails_outside_runtime() {
        let (scheduler, _fired) = TokioReminderScheduler::new();

        let result = scheduler.schedule("No runtime", Utc::now());

        assert!(matches!(result, Err(AppError::Reminder(_))));
    }
}

//! # Notification Drain Consumer
//!
//! Stateless periodic consumer for the notification queue. Retry state is
//! the persisted `scheduled_for` timestamp, so backoff survives process
//! restarts: a task failed at attempt N simply becomes due again after the
//! configured delay and is picked up by whichever instance drains next.
//!
//! Runs on its own schedule with no ordering dependency on the day
//! processor; it only touches notification task rows.

use chrono::Duration;
use sqlx::PgPool;
use tracing::{error, info, instrument, warn};

use crate::config::NotificationConfig;
use crate::error::Result;
use crate::models::NotificationTask;
use crate::notifications::delivery::DeliveryChannel;
use crate::notifications::templates::TemplateKind;

/// Outcome of one drain invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DrainSummary {
    pub processed: usize,
    pub sent: usize,
    pub failed: usize,
}

pub struct NotificationDrain<C: DeliveryChannel> {
    pool: PgPool,
    channel: C,
    config: NotificationConfig,
}

impl<C: DeliveryChannel> NotificationDrain<C> {
    pub fn new(pool: PgPool, channel: C, config: NotificationConfig) -> Self {
        Self {
            pool,
            channel,
            config,
        }
    }

    /// Deliver up to `batch_size` due pending tasks.
    ///
    /// Failures increment the attempt counter and either reschedule with
    /// backoff or, once attempts are exhausted, mark the task permanently
    /// failed for manual inspection.
    #[instrument(skip(self))]
    pub async fn drain(&self, batch_size: i64) -> Result<DrainSummary> {
        let tasks = NotificationTask::fetch_due(&self.pool, batch_size).await?;

        if tasks.is_empty() {
            return Ok(DrainSummary::default());
        }

        let mut summary = DrainSummary {
            processed: tasks.len(),
            ..DrainSummary::default()
        };

        for task in tasks {
            match self.deliver(&task).await {
                Ok(()) => {
                    NotificationTask::mark_sent(&self.pool, task.notification_task_id).await?;
                    summary.sent += 1;
                }
                Err(message) => {
                    self.record_failure(&task, &message).await?;
                    summary.failed += 1;
                }
            }
        }

        info!(
            processed = summary.processed,
            sent = summary.sent,
            failed = summary.failed,
            "Notification drain complete"
        );

        Ok(summary)
    }

    async fn deliver(&self, task: &NotificationTask) -> std::result::Result<(), String> {
        let kind = TemplateKind::parse(&task.template_kind).map_err(|e| e.to_string())?;
        let html = kind.render(&task.payload);

        self.channel
            .send(&task.to_email, &task.subject, &html)
            .await
            .map(|receipt| {
                info!(
                    notification_task_id = task.notification_task_id,
                    provider_id = %receipt.provider_id,
                    template_kind = %task.template_kind,
                    "Notification sent"
                );
            })
            .map_err(|e| e.to_string())
    }

    async fn record_failure(&self, task: &NotificationTask, message: &str) -> Result<()> {
        let attempts_after = task.attempts + 1;

        let next_attempt_at = if attempts_after < task.max_attempts {
            let delay = self.retry_delay_minutes(attempts_after);
            warn!(
                notification_task_id = task.notification_task_id,
                attempts = attempts_after,
                retry_in_minutes = delay,
                error = message,
                "Delivery failed, rescheduling"
            );
            Some(chrono::Utc::now().naive_utc() + Duration::minutes(delay))
        } else {
            error!(
                notification_task_id = task.notification_task_id,
                attempts = attempts_after,
                error = message,
                "Delivery attempts exhausted, marking failed"
            );
            None
        };

        NotificationTask::record_failure(
            &self.pool,
            task.notification_task_id,
            message,
            next_attempt_at,
        )
        .await?;

        Ok(())
    }

    /// Delay table lookup indexed by attempt number, clamped to the last entry
    fn retry_delay_minutes(&self, attempts_after: i32) -> i64 {
        let table = &self.config.retry_delay_minutes;
        let index = ((attempts_after - 1).max(0) as usize).min(table.len() - 1);
        table[index]
    }
}

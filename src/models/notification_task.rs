//! # Notification Task Model
//!
//! A durable queue entry for at-least-once delivery. The producer runs only
//! inside the transaction that created the state transition warranting the
//! notification; the unique `idempotency_key` makes re-enqueueing a no-op,
//! which is what keeps reprocessed days from double-notifying.
//!
//! Delivery status lifecycle: `pending` → `sent`, or `pending` → ... →
//! `failed` once attempts are exhausted. A `failed` task is never retried
//! automatically; the admin `retry` surface resets it explicitly.
//!
//! Idempotency key formats:
//! - strike warning: `strike:{participant_id}:day{day_number}`
//! - elimination: `elimination:{participant_id}`

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgConnection, PgPool};

/// Delivery statuses stored in the `status` column
pub mod delivery_status {
    pub const PENDING: &str = "pending";
    pub const SENT: &str = "sent";
    pub const FAILED: &str = "failed";
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct NotificationTask {
    pub notification_task_id: i64,
    pub participant_id: i64,
    pub to_email: String,
    pub template_kind: String,
    pub subject: String,
    pub payload: serde_json::Value,
    pub idempotency_key: String,
    pub status: String,
    pub attempts: i32,
    pub max_attempts: i32,
    pub scheduled_for: NaiveDateTime,
    pub last_attempt_at: Option<NaiveDateTime>,
    pub sent_at: Option<NaiveDateTime>,
    pub last_error: Option<String>,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewNotificationTask {
    pub participant_id: i64,
    pub to_email: String,
    pub template_kind: String,
    pub subject: String,
    pub payload: serde_json::Value,
    pub idempotency_key: String,
}

const TASK_COLUMNS: &str = r#"
    notification_task_id, participant_id, to_email, template_kind, subject,
    payload, idempotency_key, status, attempts, max_attempts, scheduled_for,
    last_attempt_at, sent_at, last_error, created_at
"#;

impl NotificationTask {
    /// Enqueue inside the originating transaction.
    ///
    /// Returns None when a task with the same idempotency key already exists
    /// ("already queued", not an error).
    pub async fn enqueue(
        conn: &mut PgConnection,
        new_task: NewNotificationTask,
    ) -> Result<Option<NotificationTask>, sqlx::Error> {
        sqlx::query_as::<_, NotificationTask>(&format!(
            r#"
            INSERT INTO gauntlet_notification_tasks
                (participant_id, to_email, template_kind, subject, payload,
                 idempotency_key, scheduled_for, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, NOW(), NOW())
            ON CONFLICT (idempotency_key) DO NOTHING
            RETURNING {TASK_COLUMNS}
            "#,
        ))
        .bind(new_task.participant_id)
        .bind(new_task.to_email)
        .bind(new_task.template_kind)
        .bind(new_task.subject)
        .bind(new_task.payload)
        .bind(new_task.idempotency_key)
        .fetch_optional(conn)
        .await
    }

    /// Pending tasks that are due and still have attempts left, oldest first
    pub async fn fetch_due(
        pool: &PgPool,
        batch_size: i64,
    ) -> Result<Vec<NotificationTask>, sqlx::Error> {
        sqlx::query_as::<_, NotificationTask>(&format!(
            r#"
            SELECT {TASK_COLUMNS}
            FROM gauntlet_notification_tasks
            WHERE status = 'pending'
              AND scheduled_for <= NOW()
              AND attempts < max_attempts
            ORDER BY scheduled_for ASC
            LIMIT $1
            "#,
        ))
        .bind(batch_size)
        .fetch_all(pool)
        .await
    }

    pub async fn mark_sent(
        pool: &PgPool,
        notification_task_id: i64,
    ) -> Result<NotificationTask, sqlx::Error> {
        sqlx::query_as::<_, NotificationTask>(&format!(
            r#"
            UPDATE gauntlet_notification_tasks
            SET status = 'sent',
                sent_at = NOW(),
                attempts = attempts + 1,
                last_attempt_at = NOW()
            WHERE notification_task_id = $1
            RETURNING {TASK_COLUMNS}
            "#,
        ))
        .bind(notification_task_id)
        .fetch_one(pool)
        .await
    }

    /// Record a delivery failure.
    ///
    /// With `next_attempt_at` set the task goes back to `pending` at that
    /// time; without it the task is permanently `failed`.
    pub async fn record_failure(
        pool: &PgPool,
        notification_task_id: i64,
        error: &str,
        next_attempt_at: Option<NaiveDateTime>,
    ) -> Result<NotificationTask, sqlx::Error> {
        let status = if next_attempt_at.is_some() {
            delivery_status::PENDING
        } else {
            delivery_status::FAILED
        };

        sqlx::query_as::<_, NotificationTask>(&format!(
            r#"
            UPDATE gauntlet_notification_tasks
            SET status = $2,
                attempts = attempts + 1,
                last_attempt_at = NOW(),
                last_error = $3,
                scheduled_for = COALESCE($4, scheduled_for)
            WHERE notification_task_id = $1
            RETURNING {TASK_COLUMNS}
            "#,
        ))
        .bind(notification_task_id)
        .bind(status)
        .bind(error)
        .bind(next_attempt_at)
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        notification_task_id: i64,
    ) -> Result<Option<NotificationTask>, sqlx::Error> {
        sqlx::query_as::<_, NotificationTask>(&format!(
            "SELECT {TASK_COLUMNS} FROM gauntlet_notification_tasks WHERE notification_task_id = $1",
        ))
        .bind(notification_task_id)
        .fetch_optional(pool)
        .await
    }

    pub async fn find_by_idempotency_key(
        pool: &PgPool,
        idempotency_key: &str,
    ) -> Result<Option<NotificationTask>, sqlx::Error> {
        sqlx::query_as::<_, NotificationTask>(&format!(
            "SELECT {TASK_COLUMNS} FROM gauntlet_notification_tasks WHERE idempotency_key = $1",
        ))
        .bind(idempotency_key)
        .fetch_optional(pool)
        .await
    }

    /// Admin queue surface: list with optional status/kind filters
    pub async fn list(
        pool: &PgPool,
        status: Option<&str>,
        template_kind: Option<&str>,
        limit: i64,
    ) -> Result<Vec<NotificationTask>, sqlx::Error> {
        sqlx::query_as::<_, NotificationTask>(&format!(
            r#"
            SELECT {TASK_COLUMNS}
            FROM gauntlet_notification_tasks
            WHERE ($1::varchar IS NULL OR status = $1)
              AND ($2::varchar IS NULL OR template_kind = $2)
            ORDER BY created_at DESC
            LIMIT $3
            "#,
        ))
        .bind(status)
        .bind(template_kind)
        .bind(limit)
        .fetch_all(pool)
        .await
    }

    /// Admin retry: put a task back on the queue for immediate delivery
    pub async fn retry(
        pool: &PgPool,
        notification_task_id: i64,
    ) -> Result<Option<NotificationTask>, sqlx::Error> {
        sqlx::query_as::<_, NotificationTask>(&format!(
            r#"
            UPDATE gauntlet_notification_tasks
            SET status = 'pending',
                scheduled_for = NOW(),
                attempts = 0,
                last_error = NULL,
                last_attempt_at = NULL
            WHERE notification_task_id = $1
            RETURNING {TASK_COLUMNS}
            "#,
        ))
        .bind(notification_task_id)
        .fetch_optional(pool)
        .await
    }

    pub async fn delete(
        pool: &PgPool,
        notification_task_id: i64,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM gauntlet_notification_tasks WHERE notification_task_id = $1",
        )
        .bind(notification_task_id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn count_pending(pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM gauntlet_notification_tasks WHERE status = 'pending'",
        )
        .fetch_one(pool)
        .await
    }

    /// Strike-warning idempotency key for (participant, day)
    pub fn strike_key(participant_id: i64, day_number: i32) -> String {
        format!("strike:{participant_id}:day{day_number}")
    }

    /// Elimination idempotency key; one per participant lifetime
    pub fn elimination_key(participant_id: i64) -> String {
        format!("elimination:{participant_id}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_idempotency_key_formats() {
        assert_eq!(NotificationTask::strike_key(7, 12), "strike:7:day12");
        assert_eq!(NotificationTask::elimination_key(7), "elimination:7");
    }
}

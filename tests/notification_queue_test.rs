//! Notification Queue Tests
//!
//! Producer dedup, drain delivery, bounded exponential backoff, and
//! permanent failure after exhausted attempts.

mod common;

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;
use sqlx::PgPool;

use common::seed_participant;
use gauntlet_core::config::NotificationConfig;
use gauntlet_core::models::{NewNotificationTask, NotificationTask};
use gauntlet_core::notifications::{
    DeliveryChannel, DeliveryError, DeliveryReceipt, NotificationDrain,
};

/// Fails the first `failures` sends, then succeeds
struct FlakyChannel {
    failures: usize,
    calls: AtomicUsize,
}

impl FlakyChannel {
    fn failing(failures: usize) -> Self {
        Self {
            failures,
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl DeliveryChannel for FlakyChannel {
    async fn send(
        &self,
        to: &str,
        _subject: &str,
        _html_body: &str,
    ) -> Result<DeliveryReceipt, DeliveryError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if call < self.failures {
            Err(DeliveryError::Unavailable {
                message: "simulated outage".to_string(),
            })
        } else {
            Ok(DeliveryReceipt {
                provider_id: format!("msg-{to}-{call}"),
            })
        }
    }
}

async fn enqueue_warning(pool: &PgPool, participant_id: i64, day_number: i32) -> NotificationTask {
    let mut tx = pool.begin().await.unwrap();
    let task = NotificationTask::enqueue(
        &mut tx,
        NewNotificationTask {
            participant_id,
            to_email: "target@example.com".to_string(),
            template_kind: "strike_1".to_string(),
            subject: "Strike 1 - Gauntlet Daily Challenge".to_string(),
            payload: json!({"name": "Target", "day_number": day_number, "remaining": 2}),
            idempotency_key: NotificationTask::strike_key(participant_id, day_number),
        },
    )
    .await
    .unwrap()
    .expect("first enqueue inserts");
    tx.commit().await.unwrap();
    task
}

/// Force a rescheduled task to be due now
async fn make_due(pool: &PgPool, notification_task_id: i64) {
    sqlx::query(
        "UPDATE gauntlet_notification_tasks SET scheduled_for = NOW() WHERE notification_task_id = $1",
    )
    .bind(notification_task_id)
    .execute(pool)
    .await
    .unwrap();
}

#[sqlx::test]
async fn test_enqueue_deduplicates_on_idempotency_key(pool: PgPool) -> sqlx::Result<()> {
    let participant = seed_participant(&pool, "dedup", Some("d@example.com")).await;
    enqueue_warning(&pool, participant.participant_id, 1).await;

    let mut tx = pool.begin().await?;
    let second = NotificationTask::enqueue(
        &mut tx,
        NewNotificationTask {
            participant_id: participant.participant_id,
            to_email: "d@example.com".to_string(),
            template_kind: "strike_1".to_string(),
            subject: "Strike 1 - Gauntlet Daily Challenge".to_string(),
            payload: json!({}),
            idempotency_key: NotificationTask::strike_key(participant.participant_id, 1),
        },
    )
    .await?;
    tx.commit().await?;

    assert!(second.is_none(), "duplicate key is an already-queued no-op");
    assert_eq!(NotificationTask::count_pending(&pool).await?, 1);

    Ok(())
}

#[sqlx::test]
async fn test_drain_delivers_and_marks_sent(pool: PgPool) -> sqlx::Result<()> {
    let participant = seed_participant(&pool, "happy", Some("h@example.com")).await;
    let task = enqueue_warning(&pool, participant.participant_id, 1).await;

    let drain = NotificationDrain::new(
        pool.clone(),
        FlakyChannel::failing(0),
        NotificationConfig::default(),
    );
    let summary = drain.drain(10).await.unwrap();
    assert_eq!(summary.processed, 1);
    assert_eq!(summary.sent, 1);
    assert_eq!(summary.failed, 0);

    let sent = NotificationTask::find_by_id(&pool, task.notification_task_id)
        .await?
        .unwrap();
    assert_eq!(sent.status, "sent");
    assert_eq!(sent.attempts, 1);
    assert!(sent.sent_at.is_some());

    // Nothing left to drain
    let empty = drain.drain(10).await.unwrap();
    assert_eq!(empty.processed, 0);

    Ok(())
}

#[sqlx::test]
async fn test_two_failures_then_success_follows_backoff(pool: PgPool) -> sqlx::Result<()> {
    // Scenario D: fail, fail, succeed; final attempts = 3
    let participant = seed_participant(&pool, "retry", Some("r@example.com")).await;
    let task = enqueue_warning(&pool, participant.participant_id, 1).await;

    let drain = NotificationDrain::new(
        pool.clone(),
        FlakyChannel::failing(2),
        NotificationConfig::default(),
    );

    // Attempt 1 fails; rescheduled one minute out
    let summary = drain.drain(10).await.unwrap();
    assert_eq!(summary.failed, 1);
    let after_first = NotificationTask::find_by_id(&pool, task.notification_task_id)
        .await?
        .unwrap();
    assert_eq!(after_first.status, "pending");
    assert_eq!(after_first.attempts, 1);
    assert!(after_first.last_error.is_some());
    let delay = after_first.scheduled_for - Utc::now().naive_utc();
    assert!(delay.num_seconds() > 40 && delay.num_seconds() <= 70);

    // Not due yet, so a drain in between sees nothing
    assert_eq!(drain.drain(10).await.unwrap().processed, 0);

    // Attempt 2 fails; rescheduled five minutes out
    make_due(&pool, task.notification_task_id).await;
    drain.drain(10).await.unwrap();
    let after_second = NotificationTask::find_by_id(&pool, task.notification_task_id)
        .await?
        .unwrap();
    assert_eq!(after_second.attempts, 2);
    let delay = after_second.scheduled_for - Utc::now().naive_utc();
    assert!(delay.num_minutes() >= 4 && delay.num_minutes() <= 6);

    // Attempt 3 succeeds
    make_due(&pool, task.notification_task_id).await;
    let summary = drain.drain(10).await.unwrap();
    assert_eq!(summary.sent, 1);
    let done = NotificationTask::find_by_id(&pool, task.notification_task_id)
        .await?
        .unwrap();
    assert_eq!(done.status, "sent");
    assert_eq!(done.attempts, 3);

    Ok(())
}

#[sqlx::test]
async fn test_exhausted_attempts_fail_permanently(pool: PgPool) -> sqlx::Result<()> {
    let participant = seed_participant(&pool, "undeliverable", Some("u@example.com")).await;
    let task = enqueue_warning(&pool, participant.participant_id, 1).await;

    let drain = NotificationDrain::new(
        pool.clone(),
        FlakyChannel::failing(usize::MAX),
        NotificationConfig::default(),
    );

    for _ in 0..3 {
        make_due(&pool, task.notification_task_id).await;
        drain.drain(10).await.unwrap();
    }

    let dead = NotificationTask::find_by_id(&pool, task.notification_task_id)
        .await?
        .unwrap();
    assert_eq!(dead.status, "failed");
    assert_eq!(dead.attempts, 3);

    // Permanently failed tasks are never picked up again
    make_due(&pool, task.notification_task_id).await;
    assert_eq!(drain.drain(10).await.unwrap().processed, 0);

    Ok(())
}

#[sqlx::test]
async fn test_admin_retry_requeues_a_failed_task(pool: PgPool) -> sqlx::Result<()> {
    let participant = seed_participant(&pool, "second_chance", Some("s@example.com")).await;
    let task = enqueue_warning(&pool, participant.participant_id, 1).await;

    let failing = NotificationDrain::new(
        pool.clone(),
        FlakyChannel::failing(usize::MAX),
        NotificationConfig::default(),
    );
    for _ in 0..3 {
        make_due(&pool, task.notification_task_id).await;
        failing.drain(10).await.unwrap();
    }

    let retried = NotificationTask::retry(&pool, task.notification_task_id)
        .await?
        .expect("task exists");
    assert_eq!(retried.status, "pending");
    assert_eq!(retried.attempts, 0);
    assert!(retried.last_error.is_none());

    let working = NotificationDrain::new(
        pool.clone(),
        FlakyChannel::failing(0),
        NotificationConfig::default(),
    );
    let summary = working.drain(10).await.unwrap();
    assert_eq!(summary.sent, 1);

    Ok(())
}

#[sqlx::test]
async fn test_unknown_template_kind_burns_an_attempt(pool: PgPool) -> sqlx::Result<()> {
    let participant = seed_participant(&pool, "odd", Some("o@example.com")).await;

    let mut tx = pool.begin().await?;
    let task = NotificationTask::enqueue(
        &mut tx,
        NewNotificationTask {
            participant_id: participant.participant_id,
            to_email: "o@example.com".to_string(),
            template_kind: "postcard".to_string(),
            subject: "Odd".to_string(),
            payload: json!({}),
            idempotency_key: "odd:1".to_string(),
        },
    )
    .await?
    .unwrap();
    tx.commit().await?;

    let drain = NotificationDrain::new(
        pool.clone(),
        FlakyChannel::failing(0),
        NotificationConfig::default(),
    );
    let summary = drain.drain(10).await.unwrap();
    assert_eq!(summary.failed, 1);

    let after = NotificationTask::find_by_id(&pool, task.notification_task_id)
        .await?
        .unwrap();
    assert_eq!(after.attempts, 1);
    assert!(after.last_error.unwrap().contains("Unknown template kind"));

    Ok(())
}

//! Reprocessing / Backfill Tests
//!
//! Re-running a day after correcting upstream data must only touch
//! participants with no existing record; everything else is skipped by the
//! per-record idempotency guards.

mod common;

use sqlx::PgPool;

use common::{processor, reload_participant, seed_ingested_day, seed_participant};
use gauntlet_core::models::{DailyOutcome, NewParticipant, NotificationTask, Participant};
use gauntlet_core::results::ingest_results;
use gauntlet_core::GauntletError;

#[sqlx::test]
async fn test_reprocess_with_unchanged_data_is_a_noop(pool: PgPool) -> sqlx::Result<()> {
    for handle in ["one", "two", "three"] {
        seed_participant(&pool, handle, Some("x@example.com")).await;
    }
    seed_ingested_day(&pool, 5, &[("one", 10), ("two", 20)]).await;

    let runner = processor(&pool);
    runner.process_day(5).await.unwrap();

    let outcome = runner.reprocess_day(5).await.unwrap();
    let summary = outcome.summary().expect("reprocess ran");
    assert_eq!(summary.solved, 0);
    assert_eq!(summary.strikes, 0);
    assert_eq!(summary.eliminations, 0);
    assert_eq!(summary.skipped, 3, "every participant already recorded");

    assert_eq!(DailyOutcome::count_for_day(&pool, 5).await?, 3);

    Ok(())
}

#[sqlx::test]
async fn test_reprocess_does_not_double_notify(pool: PgPool) -> sqlx::Result<()> {
    let participant = seed_participant(&pool, "warned", Some("w@example.com")).await;
    seed_ingested_day(&pool, 2, &[]).await;

    let runner = processor(&pool);
    runner.process_day(2).await.unwrap();
    runner.reprocess_day(2).await.unwrap();

    let tasks = NotificationTask::list(&pool, None, None, 10).await?;
    assert_eq!(tasks.len(), 1, "idempotency key deduplicates the warning");
    assert_eq!(
        tasks[0].idempotency_key,
        NotificationTask::strike_key(participant.participant_id, 2)
    );

    Ok(())
}

#[sqlx::test]
async fn test_late_submission_does_not_overwrite_recorded_miss(pool: PgPool) -> sqlx::Result<()> {
    // Scenario E: the participant was already marked missed; append-only
    // outcome wins over the corrected upstream data
    let missed = seed_participant(&pool, "missed_then_fixed", None).await;
    seed_ingested_day(&pool, 4, &[]).await;

    let runner = processor(&pool);
    runner.process_day(4).await.unwrap();

    ingest_results(&pool, 4, &[("missed_then_fixed".to_string(), 75)])
        .await
        .unwrap();
    runner.reprocess_day(4).await.unwrap();

    let mut conn = pool.acquire().await?;
    let outcome = DailyOutcome::find_for_participant_day(&mut conn, missed.participant_id, 4)
        .await?
        .expect("outcome exists");
    assert!(!outcome.solved, "recorded outcome is never overwritten");

    let reloaded = reload_participant(&pool, missed.participant_id).await;
    assert_eq!(reloaded.total_score, 0);
    assert_eq!(reloaded.strike_count, 1);

    Ok(())
}

#[sqlx::test]
async fn test_reprocess_picks_up_newly_eligible_participant(pool: PgPool) -> sqlx::Result<()> {
    seed_participant(&pool, "original", None).await;
    seed_ingested_day(&pool, 3, &[("original", 10), ("registered_late", 60)]).await;

    let runner = processor(&pool);
    runner.process_day(3).await.unwrap();

    // Registered after the first run; has no outcome yet
    let late = Participant::create(
        &pool,
        NewParticipant {
            handle: "registered_late".to_string(),
            display_name: "Registered Late".to_string(),
            email: None,
            joined_day: Some(3),
        },
    )
    .await?;

    let outcome = runner.reprocess_day(3).await.unwrap();
    let summary = outcome.summary().expect("reprocess ran");
    assert_eq!(summary.solved, 1, "only the new participant is processed");
    assert_eq!(summary.skipped, 1);

    let reloaded = reload_participant(&pool, late.participant_id).await;
    assert_eq!(reloaded.total_score, 60);

    Ok(())
}

#[sqlx::test]
async fn test_reprocess_validates_day_bounds(pool: PgPool) -> sqlx::Result<()> {
    let runner = processor(&pool);

    let err = runner.reprocess_day(0).await.unwrap_err();
    assert!(matches!(
        err,
        GauntletError::InvalidDayNumber { day_number: 0, .. }
    ));

    let err = runner.reprocess_day(99).await.unwrap_err();
    assert!(matches!(
        err,
        GauntletError::InvalidDayNumber { day_number: 99, .. }
    ));

    let err = runner.reprocess_day(5).await.unwrap_err();
    assert!(matches!(err, GauntletError::DayNotFound { day_number: 5 }));

    Ok(())
}

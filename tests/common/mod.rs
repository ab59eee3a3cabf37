//! Shared seed helpers for integration tests.

#![allow(dead_code)]

use sqlx::PgPool;

use gauntlet_core::config::ProcessingConfig;
use gauntlet_core::models::{ContestDay, NewContestDay, NewParticipant, Participant};
use gauntlet_core::processing::DayProcessor;
use gauntlet_core::results::{ingest_results, StoredResultSource};

pub async fn seed_participant(pool: &PgPool, handle: &str, email: Option<&str>) -> Participant {
    Participant::create(
        pool,
        NewParticipant {
            handle: handle.to_string(),
            display_name: format!("{handle} (test)"),
            email: email.map(str::to_string),
            joined_day: None,
        },
    )
    .await
    .expect("seed participant")
}

/// Put a participant into a mid-contest counter state directly
pub async fn set_counters(
    pool: &PgPool,
    participant_id: i64,
    strike_count: i32,
    consecutive_miss: i32,
) {
    sqlx::query(
        r#"
        UPDATE gauntlet_participants
        SET strike_count = $2, consecutive_miss = $3
        WHERE participant_id = $1
        "#,
    )
    .bind(participant_id)
    .bind(strike_count)
    .bind(consecutive_miss)
    .execute(pool)
    .await
    .expect("set counters");
}

/// Create a contest day and land the given results for it
pub async fn seed_ingested_day(pool: &PgPool, day_number: i32, rows: &[(&str, i32)]) -> ContestDay {
    ContestDay::create(
        pool,
        NewContestDay {
            day_number,
            title: None,
        },
    )
    .await
    .expect("seed contest day");

    let owned: Vec<(String, i32)> = rows
        .iter()
        .map(|(handle, score)| (handle.to_string(), *score))
        .collect();
    ingest_results(pool, day_number, &owned)
        .await
        .expect("ingest results");

    ContestDay::find_by_day_number(pool, day_number)
        .await
        .expect("reload contest day")
        .expect("contest day exists")
}

pub fn processor(pool: &PgPool) -> DayProcessor<StoredResultSource> {
    DayProcessor::new(
        pool.clone(),
        StoredResultSource::new(pool.clone()),
        ProcessingConfig::default(),
    )
}

pub async fn reload_participant(pool: &PgPool, participant_id: i64) -> Participant {
    Participant::find_by_id(pool, participant_id)
        .await
        .expect("reload participant")
        .expect("participant exists")
}

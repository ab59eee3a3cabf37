//! # Daily Outcome Model
//!
//! The permanent, append-only record of whether a participant solved a given
//! day. Existence of a row for (participant, day) is the per-participant
//! idempotency guard: it means "already processed for this day". Rows are
//! never updated or overwritten, including by reprocessing.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgConnection, PgPool};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct DailyOutcome {
    pub daily_outcome_id: i64,
    pub participant_id: i64,
    pub day_number: i32,
    pub solved: bool,
    pub score: i32,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewDailyOutcome {
    pub participant_id: i64,
    pub day_number: i32,
    pub solved: bool,
    pub score: i32,
}

const OUTCOME_COLUMNS: &str =
    "daily_outcome_id, participant_id, day_number, solved, score, created_at";

impl DailyOutcome {
    /// Transactional existence check, the idempotency guard
    pub async fn find_for_participant_day(
        conn: &mut PgConnection,
        participant_id: i64,
        day_number: i32,
    ) -> Result<Option<DailyOutcome>, sqlx::Error> {
        sqlx::query_as::<_, DailyOutcome>(&format!(
            r#"
            SELECT {OUTCOME_COLUMNS}
            FROM gauntlet_daily_outcomes
            WHERE participant_id = $1 AND day_number = $2
            "#,
        ))
        .bind(participant_id)
        .bind(day_number)
        .fetch_optional(conn)
        .await
    }

    pub async fn create(
        conn: &mut PgConnection,
        new_outcome: NewDailyOutcome,
    ) -> Result<DailyOutcome, sqlx::Error> {
        sqlx::query_as::<_, DailyOutcome>(&format!(
            r#"
            INSERT INTO gauntlet_daily_outcomes (participant_id, day_number, solved, score, created_at)
            VALUES ($1, $2, $3, $4, NOW())
            RETURNING {OUTCOME_COLUMNS}
            "#,
        ))
        .bind(new_outcome.participant_id)
        .bind(new_outcome.day_number)
        .bind(new_outcome.solved)
        .bind(new_outcome.score)
        .fetch_one(conn)
        .await
    }

    pub async fn list_for_participant(
        pool: &PgPool,
        participant_id: i64,
    ) -> Result<Vec<DailyOutcome>, sqlx::Error> {
        sqlx::query_as::<_, DailyOutcome>(&format!(
            r#"
            SELECT {OUTCOME_COLUMNS}
            FROM gauntlet_daily_outcomes
            WHERE participant_id = $1
            ORDER BY day_number
            "#,
        ))
        .bind(participant_id)
        .fetch_all(pool)
        .await
    }

    pub async fn count_for_day(pool: &PgPool, day_number: i32) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM gauntlet_daily_outcomes WHERE day_number = $1",
        )
        .bind(day_number)
        .fetch_one(pool)
        .await
    }
}

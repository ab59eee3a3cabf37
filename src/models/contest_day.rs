//! # Contest Day Model
//!
//! One row per contest day. `is_ingested` gates processing (results must have
//! landed first); `is_processed` is the whole-day idempotency guard set by the
//! day processor and cleared only by the reprocessing path.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct ContestDay {
    pub contest_day_id: i64,
    pub day_number: i32,
    pub title: Option<String>,
    pub is_ingested: bool,
    pub is_processed: bool,
    pub ingested_at: Option<NaiveDateTime>,
    pub processed_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewContestDay {
    pub day_number: i32,
    pub title: Option<String>,
}

const CONTEST_DAY_COLUMNS: &str = r#"
    contest_day_id, day_number, title, is_ingested, is_processed,
    ingested_at, processed_at, created_at
"#;

impl ContestDay {
    pub async fn create(pool: &PgPool, new_day: NewContestDay) -> Result<ContestDay, sqlx::Error> {
        sqlx::query_as::<_, ContestDay>(&format!(
            r#"
            INSERT INTO gauntlet_contest_days (day_number, title, created_at)
            VALUES ($1, $2, NOW())
            RETURNING {CONTEST_DAY_COLUMNS}
            "#,
        ))
        .bind(new_day.day_number)
        .bind(new_day.title)
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_day_number(
        pool: &PgPool,
        day_number: i32,
    ) -> Result<Option<ContestDay>, sqlx::Error> {
        sqlx::query_as::<_, ContestDay>(&format!(
            "SELECT {CONTEST_DAY_COLUMNS} FROM gauntlet_contest_days WHERE day_number = $1",
        ))
        .bind(day_number)
        .fetch_optional(pool)
        .await
    }

    pub async fn mark_ingested(pool: &PgPool, day_number: i32) -> Result<ContestDay, sqlx::Error> {
        sqlx::query_as::<_, ContestDay>(&format!(
            r#"
            UPDATE gauntlet_contest_days
            SET is_ingested = TRUE, ingested_at = NOW()
            WHERE day_number = $1
            RETURNING {CONTEST_DAY_COLUMNS}
            "#,
        ))
        .bind(day_number)
        .fetch_one(pool)
        .await
    }

    pub async fn mark_processed(pool: &PgPool, day_number: i32) -> Result<ContestDay, sqlx::Error> {
        sqlx::query_as::<_, ContestDay>(&format!(
            r#"
            UPDATE gauntlet_contest_days
            SET is_processed = TRUE, processed_at = NOW()
            WHERE day_number = $1
            RETURNING {CONTEST_DAY_COLUMNS}
            "#,
        ))
        .bind(day_number)
        .fetch_one(pool)
        .await
    }

    /// Reopen a day for the reprocessing path; per-record guards keep the
    /// re-run safe
    pub async fn clear_processed(pool: &PgPool, day_number: i32) -> Result<ContestDay, sqlx::Error> {
        sqlx::query_as::<_, ContestDay>(&format!(
            r#"
            UPDATE gauntlet_contest_days
            SET is_processed = FALSE, processed_at = NULL
            WHERE day_number = $1
            RETURNING {CONTEST_DAY_COLUMNS}
            "#,
        ))
        .bind(day_number)
        .fetch_one(pool)
        .await
    }

    pub async fn count_processed(pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM gauntlet_contest_days WHERE is_processed = TRUE",
        )
        .fetch_one(pool)
        .await
    }
}

//! # Day Result Model
//!
//! Raw ingested results: one row per (day, handle) as reported by the
//! upstream result provider. Re-ingestion upserts the score, which is what
//! makes backfill-then-reprocess work for late submissions.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct DayResult {
    pub day_result_id: i64,
    pub day_number: i32,
    pub handle: String,
    pub score: i32,
    pub ingested_at: NaiveDateTime,
}

impl DayResult {
    /// Upsert one reported result
    pub async fn record(
        pool: &PgPool,
        day_number: i32,
        handle: &str,
        score: i32,
    ) -> Result<DayResult, sqlx::Error> {
        sqlx::query_as::<_, DayResult>(
            r#"
            INSERT INTO gauntlet_day_results (day_number, handle, score, ingested_at)
            VALUES ($1, $2, $3, NOW())
            ON CONFLICT (day_number, handle) DO UPDATE SET
                score = EXCLUDED.score,
                ingested_at = NOW()
            RETURNING day_result_id, day_number, handle, score, ingested_at
            "#,
        )
        .bind(day_number)
        .bind(handle)
        .bind(score)
        .fetch_one(pool)
        .await
    }

    /// The day's solved set keyed by lowercased handle
    ///
    /// Presence in the map is what makes a participant "solved"; the score
    /// value is carried but not consulted for that determination.
    pub async fn solved_map_for_day(
        pool: &PgPool,
        day_number: i32,
    ) -> Result<HashMap<String, i32>, sqlx::Error> {
        let rows = sqlx::query_as::<_, (String, i32)>(
            "SELECT handle, score FROM gauntlet_day_results WHERE day_number = $1",
        )
        .bind(day_number)
        .fetch_all(pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(handle, score)| (handle.to_lowercase(), score))
            .collect())
    }

    pub async fn list_for_day(pool: &PgPool, day_number: i32) -> Result<Vec<DayResult>, sqlx::Error> {
        sqlx::query_as::<_, DayResult>(
            r#"
            SELECT day_result_id, day_number, handle, score, ingested_at
            FROM gauntlet_day_results
            WHERE day_number = $1
            ORDER BY handle
            "#,
        )
        .bind(day_number)
        .fetch_all(pool)
        .await
    }
}

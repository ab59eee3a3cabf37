//! # Strike Record Model
//!
//! One row per recorded miss. `strike_number` is the ordinal in the
//! participant's historical tally; `consecutive_at` snapshots the unbroken
//! miss run at the time the strike was issued. The (participant, day)
//! uniqueness prevents double-striking.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgConnection, PgPool};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct StrikeRecord {
    pub strike_record_id: i64,
    pub participant_id: i64,
    pub day_number: i32,
    pub reason: String,
    pub strike_number: i32,
    pub consecutive_at: i32,
    pub reverted: bool,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewStrikeRecord {
    pub participant_id: i64,
    pub day_number: i32,
    pub reason: String,
    pub strike_number: i32,
    pub consecutive_at: i32,
}

const STRIKE_COLUMNS: &str = r#"
    strike_record_id, participant_id, day_number, reason,
    strike_number, consecutive_at, reverted, created_at
"#;

impl StrikeRecord {
    /// Transactional existence check, the double-strike guard
    pub async fn find_for_participant_day(
        conn: &mut PgConnection,
        participant_id: i64,
        day_number: i32,
    ) -> Result<Option<StrikeRecord>, sqlx::Error> {
        sqlx::query_as::<_, StrikeRecord>(&format!(
            r#"
            SELECT {STRIKE_COLUMNS}
            FROM gauntlet_strike_records
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
        new_strike: NewStrikeRecord,
    ) -> Result<StrikeRecord, sqlx::Error> {
        sqlx::query_as::<_, StrikeRecord>(&format!(
            r#"
            INSERT INTO gauntlet_strike_records
                (participant_id, day_number, reason, strike_number, consecutive_at, created_at)
            VALUES ($1, $2, $3, $4, $5, NOW())
            RETURNING {STRIKE_COLUMNS}
            "#,
        ))
        .bind(new_strike.participant_id)
        .bind(new_strike.day_number)
        .bind(new_strike.reason)
        .bind(new_strike.strike_number)
        .bind(new_strike.consecutive_at)
        .fetch_one(conn)
        .await
    }

    pub async fn mark_reverted(
        conn: &mut PgConnection,
        strike_record_id: i64,
    ) -> Result<StrikeRecord, sqlx::Error> {
        sqlx::query_as::<_, StrikeRecord>(&format!(
            r#"
            UPDATE gauntlet_strike_records
            SET reverted = TRUE
            WHERE strike_record_id = $1
            RETURNING {STRIKE_COLUMNS}
            "#,
        ))
        .bind(strike_record_id)
        .fetch_one(conn)
        .await
    }

    pub async fn list_for_participant(
        pool: &PgPool,
        participant_id: i64,
    ) -> Result<Vec<StrikeRecord>, sqlx::Error> {
        sqlx::query_as::<_, StrikeRecord>(&format!(
            r#"
            SELECT {STRIKE_COLUMNS}
            FROM gauntlet_strike_records
            WHERE participant_id = $1
            ORDER BY day_number
            "#,
        ))
        .bind(participant_id)
        .fetch_all(pool)
        .await
    }

    pub async fn count_for_participant(
        pool: &PgPool,
        participant_id: i64,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM gauntlet_strike_records WHERE participant_id = $1",
        )
        .bind(participant_id)
        .fetch_one(pool)
        .await
    }
}

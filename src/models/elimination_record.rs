//! # Elimination Record Model
//!
//! At most one row per participant, created inside the transaction that
//! moves them into the terminal eliminated state. Reinstatement marks the
//! record rather than deleting it, so the elimination history survives
//! re-entry.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgConnection, PgPool};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct EliminationRecord {
    pub elimination_record_id: i64,
    pub participant_id: i64,
    pub final_score: i64,
    pub total_strikes: i32,
    pub last_day_played: i32,
    pub reinstated: bool,
    pub reinstated_by: Option<String>,
    pub reinstated_at: Option<NaiveDateTime>,
    pub reinstate_reason: Option<String>,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewEliminationRecord {
    pub participant_id: i64,
    pub final_score: i64,
    pub total_strikes: i32,
    pub last_day_played: i32,
}

const ELIMINATION_COLUMNS: &str = r#"
    elimination_record_id, participant_id, final_score, total_strikes,
    last_day_played, reinstated, reinstated_by, reinstated_at,
    reinstate_reason, created_at
"#;

impl EliminationRecord {
    /// Idempotent insert guarded by the unique-per-participant constraint.
    /// Returns None when a record already exists.
    pub async fn insert_if_absent(
        conn: &mut PgConnection,
        new_record: NewEliminationRecord,
    ) -> Result<Option<EliminationRecord>, sqlx::Error> {
        sqlx::query_as::<_, EliminationRecord>(&format!(
            r#"
            INSERT INTO gauntlet_elimination_records
                (participant_id, final_score, total_strikes, last_day_played, created_at)
            VALUES ($1, $2, $3, $4, NOW())
            ON CONFLICT (participant_id) DO NOTHING
            RETURNING {ELIMINATION_COLUMNS}
            "#,
        ))
        .bind(new_record.participant_id)
        .bind(new_record.final_score)
        .bind(new_record.total_strikes)
        .bind(new_record.last_day_played)
        .fetch_optional(conn)
        .await
    }

    pub async fn find_by_participant(
        pool: &PgPool,
        participant_id: i64,
    ) -> Result<Option<EliminationRecord>, sqlx::Error> {
        sqlx::query_as::<_, EliminationRecord>(&format!(
            "SELECT {ELIMINATION_COLUMNS} FROM gauntlet_elimination_records WHERE participant_id = $1",
        ))
        .bind(participant_id)
        .fetch_optional(pool)
        .await
    }

    pub async fn mark_reinstated(
        conn: &mut PgConnection,
        participant_id: i64,
        reinstated_by: &str,
        reason: &str,
    ) -> Result<EliminationRecord, sqlx::Error> {
        sqlx::query_as::<_, EliminationRecord>(&format!(
            r#"
            UPDATE gauntlet_elimination_records
            SET reinstated = TRUE,
                reinstated_by = $2,
                reinstated_at = NOW(),
                reinstate_reason = $3
            WHERE participant_id = $1
            RETURNING {ELIMINATION_COLUMNS}
            "#,
        ))
        .bind(participant_id)
        .bind(reinstated_by)
        .bind(reason)
        .fetch_one(conn)
        .await
    }

    pub async fn list_recent(
        pool: &PgPool,
        limit: i64,
    ) -> Result<Vec<EliminationRecord>, sqlx::Error> {
        sqlx::query_as::<_, EliminationRecord>(&format!(
            r#"
            SELECT {ELIMINATION_COLUMNS}
            FROM gauntlet_elimination_records
            ORDER BY created_at DESC
            LIMIT $1
            "#,
        ))
        .bind(limit)
        .fetch_all(pool)
        .await
    }
}

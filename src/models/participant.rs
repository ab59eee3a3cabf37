//! # Participant Model
//!
//! A registered contestant. The nightly processor and the admin operations
//! are the only writers of the counter fields: `strike_count` is a
//! historical tally (never reset by reinstatement), `consecutive_miss` is
//! the current unbroken miss run (reset by any solve), `total_score`
//! accumulates awarded scores.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgConnection, PgPool};

/// Participant status values stored in the `status` column
pub mod status {
    pub const ACTIVE: &str = "active";
    pub const ELIMINATED: &str = "eliminated";
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Participant {
    pub participant_id: i64,
    /// External contest handle; solved-set matching lowercases it
    pub handle: String,
    pub display_name: String,
    /// Notification target; participants without one get no queued tasks
    pub email: Option<String>,
    pub status: String,
    pub strike_count: i32,
    pub consecutive_miss: i32,
    pub total_score: i64,
    /// First eligible day; NULL means eligible from day 1
    pub joined_day: Option<i32>,
    pub eliminated_on: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewParticipant {
    pub handle: String,
    pub display_name: String,
    pub email: Option<String>,
    pub joined_day: Option<i32>,
}

const PARTICIPANT_COLUMNS: &str = r#"
    participant_id, handle, display_name, email, status,
    strike_count, consecutive_miss, total_score, joined_day,
    eliminated_on, created_at, updated_at
"#;

impl Participant {
    pub fn is_active(&self) -> bool {
        self.status == status::ACTIVE
    }

    pub fn is_eliminated(&self) -> bool {
        self.status == status::ELIMINATED
    }

    /// Lookup key into the day's solved map
    pub fn lookup_handle(&self) -> String {
        self.handle.to_lowercase()
    }

    pub async fn create(
        pool: &PgPool,
        new_participant: NewParticipant,
    ) -> Result<Participant, sqlx::Error> {
        sqlx::query_as::<_, Participant>(&format!(
            r#"
            INSERT INTO gauntlet_participants (handle, display_name, email, joined_day, created_at, updated_at)
            VALUES ($1, $2, $3, $4, NOW(), NOW())
            RETURNING {PARTICIPANT_COLUMNS}
            "#,
        ))
        .bind(new_participant.handle)
        .bind(new_participant.display_name)
        .bind(new_participant.email)
        .bind(new_participant.joined_day)
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        participant_id: i64,
    ) -> Result<Option<Participant>, sqlx::Error> {
        sqlx::query_as::<_, Participant>(&format!(
            "SELECT {PARTICIPANT_COLUMNS} FROM gauntlet_participants WHERE participant_id = $1",
        ))
        .bind(participant_id)
        .fetch_optional(pool)
        .await
    }

    pub async fn find_by_handle(
        pool: &PgPool,
        handle: &str,
    ) -> Result<Option<Participant>, sqlx::Error> {
        sqlx::query_as::<_, Participant>(&format!(
            "SELECT {PARTICIPANT_COLUMNS} FROM gauntlet_participants WHERE LOWER(handle) = LOWER($1)",
        ))
        .bind(handle)
        .fetch_optional(pool)
        .await
    }

    /// Active participants whose contest entry started on or before `day_number`
    ///
    /// This is the eligible set the day processor walks. Ordered by id for
    /// deterministic batch logs; processing itself is order-independent.
    pub async fn find_eligible_for_day(
        pool: &PgPool,
        day_number: i32,
    ) -> Result<Vec<Participant>, sqlx::Error> {
        sqlx::query_as::<_, Participant>(&format!(
            r#"
            SELECT {PARTICIPANT_COLUMNS}
            FROM gauntlet_participants
            WHERE status = 'active'
              AND (joined_day IS NULL OR joined_day <= $1)
            ORDER BY participant_id
            "#,
        ))
        .bind(day_number)
        .fetch_all(pool)
        .await
    }

    /// Record a solve: reset the miss run, add the awarded score
    pub async fn apply_solve(
        conn: &mut PgConnection,
        participant_id: i64,
        score: i32,
    ) -> Result<Participant, sqlx::Error> {
        sqlx::query_as::<_, Participant>(&format!(
            r#"
            UPDATE gauntlet_participants
            SET consecutive_miss = 0,
                total_score = total_score + $2,
                updated_at = NOW()
            WHERE participant_id = $1
            RETURNING {PARTICIPANT_COLUMNS}
            "#,
        ))
        .bind(participant_id)
        .bind(score as i64)
        .fetch_one(conn)
        .await
    }

    /// Record a miss: bump both the historical tally and the current run
    pub async fn apply_strike(
        conn: &mut PgConnection,
        participant_id: i64,
    ) -> Result<Participant, sqlx::Error> {
        sqlx::query_as::<_, Participant>(&format!(
            r#"
            UPDATE gauntlet_participants
            SET strike_count = strike_count + 1,
                consecutive_miss = consecutive_miss + 1,
                updated_at = NOW()
            WHERE participant_id = $1
            RETURNING {PARTICIPANT_COLUMNS}
            "#,
        ))
        .bind(participant_id)
        .fetch_one(conn)
        .await
    }

    /// Terminal transition into the eliminated state
    pub async fn mark_eliminated(
        conn: &mut PgConnection,
        participant_id: i64,
    ) -> Result<Participant, sqlx::Error> {
        sqlx::query_as::<_, Participant>(&format!(
            r#"
            UPDATE gauntlet_participants
            SET status = 'eliminated',
                eliminated_on = NOW(),
                updated_at = NOW()
            WHERE participant_id = $1
            RETURNING {PARTICIPANT_COLUMNS}
            "#,
        ))
        .bind(participant_id)
        .fetch_one(conn)
        .await
    }

    /// Administrative re-entry: back to active with a fresh miss run.
    /// `strike_count` stays untouched as the permanent historical record.
    pub async fn reinstate(
        conn: &mut PgConnection,
        participant_id: i64,
    ) -> Result<Participant, sqlx::Error> {
        sqlx::query_as::<_, Participant>(&format!(
            r#"
            UPDATE gauntlet_participants
            SET status = 'active',
                eliminated_on = NULL,
                consecutive_miss = 0,
                updated_at = NOW()
            WHERE participant_id = $1
            RETURNING {PARTICIPANT_COLUMNS}
            "#,
        ))
        .bind(participant_id)
        .fetch_one(conn)
        .await
    }

    /// Administrative strike reversal; counters floor at zero
    pub async fn revert_strike_counters(
        conn: &mut PgConnection,
        participant_id: i64,
    ) -> Result<Participant, sqlx::Error> {
        sqlx::query_as::<_, Participant>(&format!(
            r#"
            UPDATE gauntlet_participants
            SET strike_count = GREATEST(strike_count - 1, 0),
                consecutive_miss = GREATEST(consecutive_miss - 1, 0),
                updated_at = NOW()
            WHERE participant_id = $1
            RETURNING {PARTICIPANT_COLUMNS}
            "#,
        ))
        .bind(participant_id)
        .fetch_one(conn)
        .await
    }
}

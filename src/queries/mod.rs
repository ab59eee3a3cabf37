//! # Dashboard Query Surface
//!
//! Read-only helpers for the surrounding product (leaderboard, admin
//! dashboard). No core logic lives here; everything is a projection of the
//! durable records.

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};

use crate::models::{ContestDay, NotificationTask};

/// One leaderboard row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct StandingsRow {
    pub participant_id: i64,
    pub handle: String,
    pub display_name: String,
    pub status: String,
    pub total_score: i64,
    pub strike_count: i32,
    pub consecutive_miss: i32,
}

/// Aggregate contest progress for the admin dashboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContestProgress {
    pub total_participants: i64,
    pub active_participants: i64,
    pub eliminated_participants: i64,
    pub processed_days: i64,
    pub pending_notifications: i64,
}

/// Current standings ordered by score, active participants first
pub async fn standings(pool: &PgPool, limit: i64) -> Result<Vec<StandingsRow>, sqlx::Error> {
    sqlx::query_as::<_, StandingsRow>(
        r#"
        SELECT participant_id, handle, display_name, status,
               total_score, strike_count, consecutive_miss
        FROM gauntlet_participants
        ORDER BY (status = 'active') DESC, total_score DESC, handle
        LIMIT $1
        "#,
    )
    .bind(limit)
    .fetch_all(pool)
    .await
}

pub async fn contest_progress(pool: &PgPool) -> Result<ContestProgress, sqlx::Error> {
    let (total, active, eliminated) = sqlx::query_as::<_, (i64, i64, i64)>(
        r#"
        SELECT COUNT(*),
               COUNT(*) FILTER (WHERE status = 'active'),
               COUNT(*) FILTER (WHERE status = 'eliminated')
        FROM gauntlet_participants
        "#,
    )
    .fetch_one(pool)
    .await?;

    let processed_days = ContestDay::count_processed(pool).await?;
    let pending_notifications = NotificationTask::count_pending(pool).await?;

    Ok(ContestProgress {
        total_participants: total,
        active_participants: active,
        eliminated_participants: eliminated,
        processed_days,
        pending_notifications,
    })
}

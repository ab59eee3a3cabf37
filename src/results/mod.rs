//! # Result Source Boundary
//!
//! The upstream provider (leaderboard scrape, manual upload) is an opaque
//! collaborator. It lands raw rows through [`ingest_results`]; the processor
//! consumes them through the [`ResultSource`] trait, which keeps the engine
//! testable against fixed in-memory sets.

use async_trait::async_trait;
use sqlx::PgPool;
use std::collections::HashMap;
use tracing::info;

use crate::error::{GauntletError, Result};
use crate::models::{ContestDay, DayResult};

/// Supplies, for a given day, the set of handles that produced a qualifying
/// submission and their awarded score. Keys are lowercased handles.
#[async_trait]
pub trait ResultSource: Send + Sync {
    async fn solved_map(&self, day_number: i32) -> Result<HashMap<String, i32>>;
}

/// Result source backed by the `gauntlet_day_results` ingestion table
pub struct StoredResultSource {
    pool: PgPool,
}

impl StoredResultSource {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ResultSource for StoredResultSource {
    async fn solved_map(&self, day_number: i32) -> Result<HashMap<String, i32>> {
        Ok(DayResult::solved_map_for_day(&self.pool, day_number).await?)
    }
}

/// Fixed in-memory result source for tests and dry runs
#[derive(Default)]
pub struct FixedResultSource {
    days: HashMap<i32, HashMap<String, i32>>,
}

impl FixedResultSource {
    pub fn with_day(mut self, day_number: i32, rows: &[(&str, i32)]) -> Self {
        let map = rows
            .iter()
            .map(|(handle, score)| (handle.to_lowercase(), *score))
            .collect();
        self.days.insert(day_number, map);
        self
    }
}

#[async_trait]
impl ResultSource for FixedResultSource {
    async fn solved_map(&self, day_number: i32) -> Result<HashMap<String, i32>> {
        Ok(self.days.get(&day_number).cloned().unwrap_or_default())
    }
}

/// Ingestion boundary: land a batch of reported results for a day and mark
/// the day ingested. Re-ingestion upserts scores, so correcting upstream
/// data then calling `reprocess_day` is the backfill path.
pub async fn ingest_results(
    pool: &PgPool,
    day_number: i32,
    rows: &[(String, i32)],
) -> Result<usize> {
    ContestDay::find_by_day_number(pool, day_number)
        .await?
        .ok_or(GauntletError::DayNotFound { day_number })?;

    for (handle, score) in rows {
        DayResult::record(pool, day_number, handle, *score).await?;
    }

    ContestDay::mark_ingested(pool, day_number).await?;

    info!(day_number, rows = rows.len(), "Results ingested");
    Ok(rows.len())
}

//! # Job Lock Model
//!
//! A single durable row per named job grants mutual exclusion across process
//! instances. Acquisition is one conditional UPDATE (compare-and-swap), never
//! a read-then-write, so two concurrent acquirers cannot both win. A lock
//! older than the staleness window is treated as abandoned by a crashed
//! holder and may be taken over.
//!
//! Release always clears the lock fields and appends run telemetry
//! (status, duration, totals), whether the run completed or failed.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct JobLock {
    pub job_lock_id: i64,
    pub job_name: String,
    pub locked_at: Option<NaiveDateTime>,
    pub locked_by: Option<String>,
    pub last_run_at: Option<NaiveDateTime>,
    pub last_run_status: Option<String>,
    pub last_run_duration_ms: Option<i64>,
    pub last_error: Option<String>,
    pub total_runs: i64,
    pub total_failures: i64,
    pub created_at: NaiveDateTime,
}

const LOCK_COLUMNS: &str = r#"
    job_lock_id, job_name, locked_at, locked_by, last_run_at,
    last_run_status, last_run_duration_ms, last_error,
    total_runs, total_failures, created_at
"#;

impl JobLock {
    /// Upsert the lock row for a named job (setup path, safe to repeat)
    pub async fn ensure(pool: &PgPool, job_name: &str) -> Result<JobLock, sqlx::Error> {
        sqlx::query_as::<_, JobLock>(&format!(
            r#"
            INSERT INTO gauntlet_job_locks (job_name, created_at)
            VALUES ($1, NOW())
            ON CONFLICT (job_name) DO UPDATE SET job_name = EXCLUDED.job_name
            RETURNING {LOCK_COLUMNS}
            "#,
        ))
        .bind(job_name)
        .fetch_one(pool)
        .await
    }

    /// Attempt to acquire the lock.
    ///
    /// Succeeds only when the row is unlocked or the existing lock is older
    /// than `staleness_minutes`. Returns false on contention; callers report
    /// a skipped run and let the external scheduler decide about retrying.
    pub async fn acquire(
        pool: &PgPool,
        job_name: &str,
        staleness_minutes: i64,
        holder: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE gauntlet_job_locks
            SET locked_at = NOW(), locked_by = $2
            WHERE job_name = $1
              AND (locked_at IS NULL OR locked_at < NOW() - make_interval(mins => $3::int))
            "#,
        )
        .bind(job_name)
        .bind(holder)
        .bind(staleness_minutes)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Release the lock and record run telemetry
    pub async fn release(
        pool: &PgPool,
        job_name: &str,
        status: &str,
        duration_ms: i64,
        error: Option<&str>,
    ) -> Result<JobLock, sqlx::Error> {
        sqlx::query_as::<_, JobLock>(&format!(
            r#"
            UPDATE gauntlet_job_locks
            SET locked_at = NULL,
                locked_by = NULL,
                last_run_at = NOW(),
                last_run_status = $2,
                last_run_duration_ms = $3,
                last_error = $4,
                total_runs = total_runs + 1,
                total_failures = total_failures + CASE WHEN $2 = 'failed' THEN 1 ELSE 0 END
            WHERE job_name = $1
            RETURNING {LOCK_COLUMNS}
            "#,
        ))
        .bind(job_name)
        .bind(status)
        .bind(duration_ms)
        .bind(error)
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_job_name(
        pool: &PgPool,
        job_name: &str,
    ) -> Result<Option<JobLock>, sqlx::Error> {
        sqlx::query_as::<_, JobLock>(&format!(
            "SELECT {LOCK_COLUMNS} FROM gauntlet_job_locks WHERE job_name = $1",
        ))
        .bind(job_name)
        .fetch_optional(pool)
        .await
    }

    pub fn is_held(&self) -> bool {
        self.locked_at.is_some()
    }
}

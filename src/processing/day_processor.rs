//! # Day Processor
//!
//! Processes one contest day exactly once, however many times and from
//! however many instances it is invoked:
//!
//! 1. Acquire the nightly job lock (contention → clean `Skipped` result).
//! 2. Check preconditions: the day must exist and be ingested; an already
//!    processed day is a clean skip.
//! 3. Load the day's solved set and the eligible participant set.
//! 4. Run the elimination state machine per participant, each inside its own
//!    transaction. A per-participant failure is logged, recorded in the
//!    summary, and does not abort the batch.
//! 5. Mark the day processed, release the lock with run telemetry.
//!
//! The lock is released on every exit path, including precondition failures
//! and batch errors.

use std::collections::HashMap;
use std::time::Instant;

use sqlx::PgPool;
use tracing::{error, info, instrument};
use uuid::Uuid;

use super::{DaySummary, ParticipantError, ProcessOutcome, SkipReason};
use crate::config::ProcessingConfig;
use crate::constants::{jobs, run_status};
use crate::error::{GauntletError, Result};
use crate::models::{ContestDay, JobLock, Participant};
use crate::results::ResultSource;
use crate::state_machine::{apply_day_event, DayEvent, TransitionOutcome};

pub struct DayProcessor<S: ResultSource> {
    pool: PgPool,
    result_source: S,
    pub(crate) config: ProcessingConfig,
    instance_id: String,
}

impl<S: ResultSource> DayProcessor<S> {
    pub fn new(pool: PgPool, result_source: S, config: ProcessingConfig) -> Self {
        Self {
            pool,
            result_source,
            config,
            instance_id: format!("processor-{}", Uuid::new_v4()),
        }
    }

    pub(crate) fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Process one day's results into participant state.
    ///
    /// Whole-day idempotent: a processed day returns
    /// `Skipped(AlreadyProcessed)` and mutates nothing. Lock contention
    /// returns `Skipped(LockHeld)`; the external scheduler decides whether
    /// to retry.
    #[instrument(skip(self), fields(instance_id = %self.instance_id))]
    pub async fn process_day(&self, day_number: i32) -> Result<ProcessOutcome> {
        JobLock::ensure(&self.pool, jobs::NIGHTLY_DAY_PROCESSOR).await?;

        let acquired = JobLock::acquire(
            &self.pool,
            jobs::NIGHTLY_DAY_PROCESSOR,
            self.config.lock_staleness_minutes,
            &self.instance_id,
        )
        .await?;

        if !acquired {
            info!(day_number, "Job lock held by another instance, skipping");
            return Ok(ProcessOutcome::Skipped(SkipReason::LockHeld));
        }

        let started = Instant::now();
        let result = self.run_locked(day_number).await;
        let duration_ms = started.elapsed().as_millis() as i64;

        let (status, last_error) = match &result {
            Ok(_) => (run_status::COMPLETED, None),
            Err(e) => (run_status::FAILED, Some(e.to_string())),
        };

        // Guaranteed-release: a failed release is logged, never allowed to
        // mask the run result
        if let Err(release_err) = JobLock::release(
            &self.pool,
            jobs::NIGHTLY_DAY_PROCESSOR,
            status,
            duration_ms,
            last_error.as_deref(),
        )
        .await
        {
            error!(error = %release_err, "Failed to release job lock");
        }

        result
    }

    async fn run_locked(&self, day_number: i32) -> Result<ProcessOutcome> {
        let contest_day = ContestDay::find_by_day_number(&self.pool, day_number)
            .await?
            .ok_or(GauntletError::DayNotFound { day_number })?;

        if !contest_day.is_ingested {
            return Err(GauntletError::DayNotIngested { day_number });
        }

        if contest_day.is_processed {
            info!(day_number, "Day already processed, skipping");
            return Ok(ProcessOutcome::Skipped(SkipReason::AlreadyProcessed));
        }

        let solved_map = self.result_source.solved_map(day_number).await?;
        let participants = Participant::find_eligible_for_day(&self.pool, day_number).await?;

        info!(
            day_number,
            solvers = solved_map.len(),
            eligible = participants.len(),
            "Processing day"
        );

        let mut summary = DaySummary::new(day_number);

        for participant in &participants {
            match self
                .process_participant(participant, day_number, &solved_map)
                .await
            {
                Ok(outcome) => summary.record(outcome),
                Err(e) => {
                    error!(
                        participant_id = participant.participant_id,
                        handle = %participant.handle,
                        error = %e,
                        "Participant processing failed"
                    );
                    summary.errors.push(ParticipantError {
                        participant_id: participant.participant_id,
                        handle: participant.handle.clone(),
                        message: e.to_string(),
                    });
                }
            }
        }

        // Individual failures do not hold the day open: re-running via
        // reprocess_day is the remediation path, and its guards skip
        // everything that succeeded here
        ContestDay::mark_processed(&self.pool, day_number).await?;

        info!(
            day_number,
            solved = summary.solved,
            strikes = summary.strikes,
            eliminations = summary.eliminations,
            skipped = summary.skipped,
            errors = summary.errors.len(),
            "Day processing complete"
        );

        Ok(ProcessOutcome::Ran(summary))
    }

    /// One participant, one transaction: idempotency check, outcome insert,
    /// counter update, strike/elimination records, notification enqueue
    async fn process_participant(
        &self,
        participant: &Participant,
        day_number: i32,
        solved_map: &HashMap<String, i32>,
    ) -> Result<TransitionOutcome> {
        let event = DayEvent::for_participant(participant, solved_map);

        let mut tx = self.pool.begin().await?;
        let outcome = apply_day_event(
            &mut tx,
            participant,
            day_number,
            event,
            self.config.elimination_threshold,
        )
        .await?;
        tx.commit().await?;

        Ok(outcome)
    }
}

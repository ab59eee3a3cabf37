//! # Reprocessing / Backfill
//!
//! The sole sanctioned mechanism for correcting a processing run. Reopens
//! the day and re-invokes the processor; every write inside the state
//! machine is guarded by its own existence check, so participants already
//! recorded for the day are skipped and only ones whose upstream data
//! changed are newly processed. Existing outcomes are never overwritten.

use tracing::{info, instrument};

use super::{DayProcessor, ProcessOutcome};
use crate::error::{GauntletError, Result};
use crate::models::ContestDay;
use crate::results::ResultSource;

impl<S: ResultSource> DayProcessor<S> {
    #[instrument(skip(self))]
    pub async fn reprocess_day(&self, day_number: i32) -> Result<ProcessOutcome> {
        let max = self.config.contest_length_days;
        if day_number < 1 || day_number > max {
            return Err(GauntletError::InvalidDayNumber { day_number, max });
        }

        let contest_day = ContestDay::find_by_day_number(self.pool(), day_number)
            .await?
            .ok_or(GauntletError::DayNotFound { day_number })?;

        if !contest_day.is_ingested {
            return Err(GauntletError::DayNotIngested { day_number });
        }

        if contest_day.is_processed {
            ContestDay::clear_processed(self.pool(), day_number).await?;
            info!(day_number, "Day reopened for reprocessing");
        }

        self.process_day(day_number).await
    }
}

//! # Administrative Operations
//!
//! Out-of-band corrections performed by an operator, never by the nightly
//! processor. Each operation is one transaction and touches only the fields
//! marked admin-mutable: reinstatement restores active status without
//! resetting the historical strike tally; strike reversal marks the record
//! reverted rather than deleting it. Audit logging of who did what is the
//! calling surface's concern.

use sqlx::PgPool;
use tracing::{info, instrument};

use crate::error::{GauntletError, Result};
use crate::models::{EliminationRecord, Participant, StrikeRecord};

/// Re-enter an eliminated participant into the contest.
///
/// Clears the eliminated status, the elimination timestamp, and the
/// consecutive-miss run; `strike_count` is intentionally left as the
/// permanent historical record. The elimination record is marked reinstated,
/// not deleted.
#[instrument(skip(pool, reason))]
pub async fn reinstate(
    pool: &PgPool,
    participant_id: i64,
    reinstated_by: &str,
    reason: &str,
) -> Result<Participant> {
    let participant = Participant::find_by_id(pool, participant_id)
        .await?
        .ok_or(GauntletError::ParticipantNotFound { participant_id })?;

    if !participant.is_eliminated() {
        return Err(GauntletError::NotEliminated { participant_id });
    }

    let mut tx = pool.begin().await?;
    let reinstated = Participant::reinstate(&mut tx, participant_id).await?;
    EliminationRecord::mark_reinstated(&mut tx, participant_id, reinstated_by, reason).await?;
    tx.commit().await?;

    info!(
        participant_id,
        handle = %reinstated.handle,
        reinstated_by,
        "Participant reinstated"
    );

    Ok(reinstated)
}

/// Reverse one recorded strike.
///
/// Marks the strike record reverted and backs both counters off by one,
/// floored at zero. Does not re-open the day or touch the daily outcome.
#[instrument(skip(pool, reason))]
pub async fn revert_strike(
    pool: &PgPool,
    participant_id: i64,
    day_number: i32,
    reason: &str,
) -> Result<Participant> {
    let mut tx = pool.begin().await?;

    let strike = StrikeRecord::find_for_participant_day(&mut tx, participant_id, day_number)
        .await?
        .ok_or(GauntletError::StrikeNotFound {
            participant_id,
            day_number,
        })?;

    StrikeRecord::mark_reverted(&mut tx, strike.strike_record_id).await?;
    let participant = Participant::revert_strike_counters(&mut tx, participant_id).await?;

    tx.commit().await?;

    info!(
        participant_id,
        day_number,
        strike_record_id = strike.strike_record_id,
        reason,
        "Strike reverted"
    );

    Ok(participant)
}

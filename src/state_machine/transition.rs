//! Transactional transition executor for one (participant, day) pair.
//!
//! Every write is guarded by an existence check or unique constraint, so the
//! executor is safe to re-run for the same pair: the second run reports
//! `Skipped` and touches nothing.

use serde_json::json;
use sqlx::PgConnection;
use tracing::debug;

use super::events::DayEvent;
use crate::constants;
use crate::models::{
    DailyOutcome, EliminationRecord, NewDailyOutcome, NewEliminationRecord, NewNotificationTask,
    NewStrikeRecord, NotificationTask, Participant, StrikeRecord,
};
use crate::notifications::templates::TemplateKind;

/// Result of one participant-day transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionOutcome {
    /// Already processed for this day; nothing was written
    Skipped,
    /// Solve recorded, miss run reset
    Solved,
    /// Strike recorded; carries the new consecutive-miss count
    Warned(i32),
    /// Strike recorded and the participant crossed the threshold
    Eliminated,
}

/// Apply one day's event to one participant on an open transaction.
///
/// Groups atomically: the idempotency check, the DailyOutcome insert, the
/// StrikeRecord/EliminationRecord inserts, the participant counter update,
/// and the notification enqueue. Partial application of any subset would be
/// an invariant violation, which is why the caller owns the transaction and
/// commits only after this returns.
pub async fn apply_day_event(
    conn: &mut PgConnection,
    participant: &Participant,
    day_number: i32,
    event: DayEvent,
    elimination_threshold: i32,
) -> Result<TransitionOutcome, sqlx::Error> {
    // Whole-pair idempotency guard
    if DailyOutcome::find_for_participant_day(conn, participant.participant_id, day_number)
        .await?
        .is_some()
    {
        debug!(
            participant_id = participant.participant_id,
            day_number, "Outcome already recorded, skipping"
        );
        return Ok(TransitionOutcome::Skipped);
    }

    match event {
        DayEvent::Solved { score } => {
            DailyOutcome::create(
                conn,
                NewDailyOutcome {
                    participant_id: participant.participant_id,
                    day_number,
                    solved: true,
                    score,
                },
            )
            .await?;

            Participant::apply_solve(conn, participant.participant_id, score).await?;

            Ok(TransitionOutcome::Solved)
        }
        DayEvent::Missed => {
            DailyOutcome::create(
                conn,
                NewDailyOutcome {
                    participant_id: participant.participant_id,
                    day_number,
                    solved: false,
                    score: 0,
                },
            )
            .await?;

            // Defensive double-check against a strike recorded without an
            // outcome row (manual intervention, partial historical data)
            if StrikeRecord::find_for_participant_day(conn, participant.participant_id, day_number)
                .await?
                .is_some()
            {
                return Ok(TransitionOutcome::Skipped);
            }

            let updated = Participant::apply_strike(conn, participant.participant_id).await?;

            StrikeRecord::create(
                conn,
                NewStrikeRecord {
                    participant_id: updated.participant_id,
                    day_number,
                    reason: constants::STRIKE_REASON_NO_SUBMISSION.to_string(),
                    strike_number: updated.strike_count,
                    consecutive_at: updated.consecutive_miss,
                },
            )
            .await?;

            if updated.consecutive_miss >= elimination_threshold {
                eliminate(conn, &updated, day_number).await?;
                Ok(TransitionOutcome::Eliminated)
            } else {
                enqueue_strike_warning(conn, &updated, day_number, elimination_threshold).await?;
                Ok(TransitionOutcome::Warned(updated.consecutive_miss))
            }
        }
    }
}

/// Terminal transition: status flip, elimination record, elimination
/// notification. The unique-per-participant constraint makes the record
/// insert idempotent.
async fn eliminate(
    conn: &mut PgConnection,
    participant: &Participant,
    day_number: i32,
) -> Result<(), sqlx::Error> {
    Participant::mark_eliminated(conn, participant.participant_id).await?;

    EliminationRecord::insert_if_absent(
        conn,
        NewEliminationRecord {
            participant_id: participant.participant_id,
            final_score: participant.total_score,
            total_strikes: participant.strike_count,
            last_day_played: day_number,
        },
    )
    .await?;

    let Some(email) = participant.email.as_deref() else {
        return Ok(());
    };

    let kind = TemplateKind::Elimination;
    NotificationTask::enqueue(
        conn,
        NewNotificationTask {
            participant_id: participant.participant_id,
            to_email: email.to_string(),
            template_kind: kind.as_str().to_string(),
            subject: kind.subject(),
            payload: json!({
                "name": participant.display_name,
                "handle": participant.handle,
                "day_number": day_number,
                "final_score": participant.total_score,
            }),
            idempotency_key: NotificationTask::elimination_key(participant.participant_id),
        },
    )
    .await?;

    Ok(())
}

async fn enqueue_strike_warning(
    conn: &mut PgConnection,
    participant: &Participant,
    day_number: i32,
    elimination_threshold: i32,
) -> Result<(), sqlx::Error> {
    let Some(email) = participant.email.as_deref() else {
        return Ok(());
    };

    let kind = TemplateKind::Strike(participant.consecutive_miss);
    NotificationTask::enqueue(
        conn,
        NewNotificationTask {
            participant_id: participant.participant_id,
            to_email: email.to_string(),
            template_kind: kind.as_str().to_string(),
            subject: kind.subject(),
            payload: json!({
                "name": participant.display_name,
                "handle": participant.handle,
                "day_number": day_number,
                "strike_number": participant.consecutive_miss,
                "remaining": (elimination_threshold - participant.consecutive_miss).max(0),
            }),
            idempotency_key: NotificationTask::strike_key(participant.participant_id, day_number),
        },
    )
    .await?;

    Ok(())
}

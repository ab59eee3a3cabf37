//! # Structured Error Handling
//!
//! Central error enum for the gauntlet core. Precondition failures carry the
//! identifying context (day number, participant id) so batch callers can log
//! and surface them without string parsing.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GauntletError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Contest day {day_number} not found")]
    DayNotFound { day_number: i32 },

    #[error("Contest day {day_number} has no ingested results")]
    DayNotIngested { day_number: i32 },

    #[error("Day number {day_number} is outside the contest range 1..={max}")]
    InvalidDayNumber { day_number: i32, max: i32 },

    #[error("Participant {participant_id} not found")]
    ParticipantNotFound { participant_id: i64 },

    #[error("Participant {participant_id} is not eliminated")]
    NotEliminated { participant_id: i64 },

    #[error("No strike recorded for participant {participant_id} on day {day_number}")]
    StrikeNotFound {
        participant_id: i64,
        day_number: i32,
    },

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Template error: {0}")]
    Template(String),
}

pub type Result<T> = std::result::Result<T, GauntletError>;

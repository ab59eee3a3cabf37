#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Gauntlet Core
//!
//! Nightly batch processing engine for a multi-day elimination contest.
//! Participants who miss a day's challenge accumulate strikes; three
//! consecutive misses eliminate them.
//!
//! ## Architecture
//!
//! An external scheduler invokes the [`processing::DayProcessor`] once per
//! day. The processor acquires a durable [`models::JobLock`], loads the
//! day's solved set through the [`results::ResultSource`] boundary, and
//! walks every eligible participant exactly once, applying the
//! [`state_machine`] transition inside one transaction per participant.
//! Transitions that warrant a notification enqueue a durable
//! [`models::NotificationTask`] in the same transaction; a separate
//! [`notifications::NotificationDrain`] delivers queued tasks on its own
//! schedule with bounded exponential backoff.
//!
//! Everything is idempotent: the day carries an `is_processed` guard, each
//! (participant, day) outcome and strike is unique, eliminations are unique
//! per participant, and notification enqueues deduplicate on an idempotency
//! key. Re-running a day (concurrently, repeatedly, or via
//! [`processing::DayProcessor::reprocess_day`] after correcting upstream
//! data) never double-applies an effect.
//!
//! ## Module Organization
//!
//! - [`models`] - Durable records: participants, days, outcomes, strikes,
//!   eliminations, notification tasks, job locks
//! - [`processing`] - Day processor and reprocessing/backfill
//! - [`state_machine`] - Per-participant elimination state machine
//! - [`notifications`] - Templates, delivery seam, drain consumer
//! - [`results`] - Result-source boundary and ingestion
//! - [`admin`] - Reinstatement and strike reversal
//! - [`queries`] - Read-only dashboard projections
//! - [`config`] - Configuration management
//! - [`database`] - Pool construction and migrations
//! - [`error`] - Structured error handling

pub mod admin;
pub mod config;
pub mod constants;
pub mod database;
pub mod error;
pub mod logging;
pub mod models;
pub mod notifications;
pub mod processing;
pub mod queries;
pub mod results;
pub mod state_machine;

pub use config::{ConfigManager, GauntletConfig};
pub use error::{GauntletError, Result};
pub use models::{
    ContestDay, DailyOutcome, DayResult, EliminationRecord, JobLock, NotificationTask, Participant,
    StrikeRecord,
};
pub use notifications::{DeliveryChannel, NotificationDrain};
pub use processing::{DayProcessor, DaySummary, ProcessOutcome, SkipReason};
pub use results::{ingest_results, ResultSource, StoredResultSource};
pub use state_machine::{DayEvent, ParticipantState, TransitionOutcome};

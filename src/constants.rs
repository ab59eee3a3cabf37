//! # System Constants
//!
//! Operational boundaries of the gauntlet processing engine: job names for
//! the distributed locks, the elimination threshold, and the notification
//! retry policy. Values that deployments tune live in [`crate::config`];
//! these are the fixed contract.

/// Named jobs coordinated through `gauntlet_job_locks`
pub mod jobs {
    /// Nightly strike/elimination processor
    pub const NIGHTLY_DAY_PROCESSOR: &str = "nightly_day_processor";
    /// Periodic notification queue drain
    pub const NOTIFICATION_DRAIN: &str = "notification_drain";
}

/// Consecutive misses that move a participant into the terminal eliminated state
pub const ELIMINATION_THRESHOLD: i32 = 3;

/// Default staleness window after which a held job lock is treated as abandoned
pub const DEFAULT_LOCK_STALENESS_MINUTES: i64 = 30;

/// Default delivery retry schedule in minutes, indexed by attempt number
pub const DEFAULT_RETRY_DELAY_MINUTES: [i64; 3] = [1, 5, 15];

/// Default delivery attempt cap before a notification is permanently failed
pub const DEFAULT_MAX_DELIVERY_ATTEMPTS: i32 = 3;

/// Default notification drain batch size
pub const DEFAULT_DRAIN_BATCH_SIZE: i64 = 50;

/// Default contest length in days
pub const DEFAULT_CONTEST_LENGTH_DAYS: i32 = 25;

/// Strike reason recorded for a missed day
pub const STRIKE_REASON_NO_SUBMISSION: &str = "no_submission";

/// Run statuses recorded in job lock telemetry
pub mod run_status {
    pub const COMPLETED: &str = "completed";
    pub const FAILED: &str = "failed";
}

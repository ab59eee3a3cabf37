//! # Database Migration Runner
//!
//! Migrations live under `migrations/` using the timestamp naming convention
//! `YYYYMMDDHHMMSS_description.sql` and are embedded at compile time, so the
//! same set is applied by production startup, the admin binary, and
//! `#[sqlx::test]` databases. The migrator serializes concurrent runs with a
//! Postgres advisory lock, which keeps parallel test threads from racing
//! schema creation.

use sqlx::migrate::Migrator;
use sqlx::PgPool;

/// Embedded migration set from the crate's `migrations/` directory
pub static MIGRATOR: Migrator = sqlx::migrate!();

pub struct DatabaseMigrations;

impl DatabaseMigrations {
    /// Apply all outstanding migrations
    pub async fn run_all(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
        MIGRATOR.run(pool).await
    }
}

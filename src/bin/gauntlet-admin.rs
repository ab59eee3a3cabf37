//! Operational entrypoint for manual and cron-triggered runs.
//!
//! ```text
//! gauntlet-admin process-day <N>     process one day's results
//! gauntlet-admin reprocess-day <N>   reopen and re-run a day
//! gauntlet-admin drain [batch]       deliver due notifications
//! gauntlet-admin init-locks          create job lock rows
//! gauntlet-admin progress            print contest progress
//! ```

use anyhow::{bail, Context};
use tracing::info;

use gauntlet_core::config::ConfigManager;
use gauntlet_core::constants::jobs;
use gauntlet_core::database::{DatabaseConnection, DatabaseMigrations};
use gauntlet_core::models::JobLock;
use gauntlet_core::notifications::{LogOnlyChannel, NotificationDrain};
use gauntlet_core::processing::DayProcessor;
use gauntlet_core::results::StoredResultSource;
use gauntlet_core::{logging, queries};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init();

    let mut args = std::env::args().skip(1);
    let command = args.next().unwrap_or_else(|| "help".to_string());

    let manager = ConfigManager::load()?;
    let config = manager.config().clone();

    let connection = DatabaseConnection::from_config(&config.database, &config.database_url())
        .await
        .context("Failed to connect to database")?;
    let pool = connection.pool().clone();

    DatabaseMigrations::run_all(&pool)
        .await
        .context("Failed to run migrations")?;

    match command.as_str() {
        "process-day" => {
            let day = parse_day(args.next())?;
            let processor = DayProcessor::new(
                pool.clone(),
                StoredResultSource::new(pool),
                config.processing,
            );
            let outcome = processor.process_day(day).await?;
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }
        "reprocess-day" => {
            let day = parse_day(args.next())?;
            let processor = DayProcessor::new(
                pool.clone(),
                StoredResultSource::new(pool),
                config.processing,
            );
            let outcome = processor.reprocess_day(day).await?;
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }
        "drain" => {
            let batch = match args.next() {
                Some(raw) => raw.parse().context("Invalid batch size")?,
                None => config.notifications.drain_batch_size,
            };
            let drain = NotificationDrain::new(pool, LogOnlyChannel, config.notifications);
            let summary = drain.drain(batch).await?;
            println!(
                "processed={} sent={} failed={}",
                summary.processed, summary.sent, summary.failed
            );
        }
        "init-locks" => {
            for job in [jobs::NIGHTLY_DAY_PROCESSOR, jobs::NOTIFICATION_DRAIN] {
                JobLock::ensure(&pool, job).await?;
                info!(job, "Lock row ready");
            }
        }
        "progress" => {
            let progress = queries::contest_progress(&pool).await?;
            println!("{}", serde_json::to_string_pretty(&progress)?);
        }
        _ => {
            eprintln!(
                "Usage: gauntlet-admin <process-day N | reprocess-day N | drain [batch] | init-locks | progress>"
            );
        }
    }

    Ok(())
}

fn parse_day(raw: Option<String>) -> anyhow::Result<i32> {
    let Some(raw) = raw else {
        bail!("Missing day number argument");
    };
    raw.parse().context("Invalid day number")
}

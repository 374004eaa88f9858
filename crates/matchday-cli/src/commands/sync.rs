//! The sync command: one full read-compare-create cycle.

use tracing::warn;

use matchday_core::{SyncOutcome, SyncReport};
use matchday_providers::google::GoogleCalendarMirror;

use crate::cli::SyncArgs;
use crate::config::AppConfig;
use crate::error::{CliError, CliResult};

/// Runs one sync cycle and prints per-fixture progress.
pub async fn run(args: &SyncArgs, config: &AppConfig) -> CliResult<()> {
    println!("Syncing fixtures...");

    let fixtures = super::fetch_fixtures(config).await?;

    let mirror = GoogleCalendarMirror::new(config.google_config().map_err(CliError::Config)?)?;
    let existing = mirror
        .list_upcoming_events(config.horizon(args.horizon_days))
        .await?;

    let attendees = config.attendees(
        &args.attendees,
        std::env::var("ATTENDEES").ok().as_deref(),
    );

    let report = matchday_core::sync(&fixtures, &existing, &attendees, &mirror).await;
    print_report(&report);

    Ok(())
}

fn print_report(report: &SyncReport) {
    if report.is_empty_run() {
        // Indistinguishable from an off-season page, so flag rather than fail.
        warn!("the venue page returned no fixtures; the page layout may have changed");
        println!("No fixtures found on the venue page.");
        return;
    }

    for entry in &report.entries {
        match &entry.outcome {
            SyncOutcome::Created => println!("  created {}", entry.summary),
            SyncOutcome::Skipped { stale_start: None } => {
                println!("  skipped {} (already scheduled)", entry.summary);
            }
            SyncOutcome::Skipped {
                stale_start: Some(start),
            } => {
                println!(
                    "  skipped {} (scheduled at {}, listing now says {})",
                    entry.summary,
                    start.format("%Y-%m-%d %H:%M"),
                    entry.fixture.kickoff.format("%Y-%m-%d %H:%M"),
                );
            }
            SyncOutcome::Failed { reason } => {
                println!("  FAILED {}: {}", entry.summary, reason);
            }
        }
    }

    println!(
        "{} created, {} skipped, {} failed",
        report.created(),
        report.skipped(),
        report.failed(),
    );
    if report.has_failures() {
        println!("Some events were not created; re-running is safe.");
    } else {
        println!("Fixtures synced!");
    }
}

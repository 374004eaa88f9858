//! The fixtures command: scrape and parse without touching the calendar.

use crate::config::AppConfig;
use crate::error::CliResult;

/// Prints the fixtures currently parsed from the venue page.
pub async fn run(config: &AppConfig) -> CliResult<()> {
    let fixtures = super::fetch_fixtures(config).await?;

    if fixtures.is_empty() {
        println!("No fixtures found on the venue page.");
        return Ok(());
    }

    for fixture in &fixtures {
        println!("{}", fixture);
    }
    Ok(())
}

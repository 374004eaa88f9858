//! Command implementations.

pub mod auth;
pub mod fixtures;
pub mod sync;

use matchday_core::Fixture;
use matchday_providers::{EmiratesSource, FixtureSource};

use crate::config::AppConfig;
use crate::error::CliResult;

/// Reads the venue page and normalizes every fixture.
///
/// A single malformed record aborts the run: the source layout has changed
/// and a silent partial sync would be worse than stopping.
async fn fetch_fixtures(config: &AppConfig) -> CliResult<Vec<Fixture>> {
    let source = EmiratesSource::new(config.emirates_config())?;
    let raw = source.list_fixtures().await?;
    let fixtures = raw
        .iter()
        .map(|record| record.normalize())
        .collect::<Result<Vec<_>, _>>()?;
    Ok(fixtures)
}

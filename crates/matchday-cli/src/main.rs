//! matchday CLI entry point.

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use matchday_cli::cli::{Cli, Command, SyncArgs};
use matchday_cli::config::AppConfig;
use matchday_cli::error::{CliError, CliResult};
use matchday_cli::commands;

/// Default filter: progress at info level for our crates, warnings elsewhere.
const DEFAULT_FILTER: &str = "warn,matchday_core=info,matchday_providers=info,matchday_cli=info";

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = if cli.debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> CliResult<()> {
    let config = match cli.config {
        Some(ref path) => AppConfig::load_from(path).map_err(CliError::Config)?,
        None => AppConfig::load().map_err(CliError::Config)?,
    };

    match cli.command {
        Some(Command::Sync(ref args)) => commands::sync::run(args, &config).await,
        Some(Command::Fixtures) => commands::fixtures::run(&config).await,
        Some(Command::Auth(ref args)) => commands::auth::run(args, &config).await,
        // Bare `matchday` performs a sync with default arguments.
        None => commands::sync::run(&SyncArgs::default(), &config).await,
    }
}

//! Command-line interface definition.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// matchday - keep your calendar in step with the fixture list
#[derive(Debug, Parser)]
#[command(name = "matchday")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, short, env = "MATCHDAY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable debug output
    #[arg(long, short = 'v')]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available commands. Running without one performs a sync.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Read the venue fixture list and create missing calendar events
    Sync(SyncArgs),

    /// List the fixtures parsed from the venue page without touching the
    /// calendar
    Fixtures,

    /// Run the one-time Google Calendar authorization flow
    Auth(AuthArgs),
}

/// Arguments for the sync command.
#[derive(Debug, Default, Args)]
pub struct SyncArgs {
    /// Attendee emails invited to created events (comma-separated;
    /// overrides the ATTENDEES environment variable and the config file)
    #[arg(long, value_delimiter = ',')]
    pub attendees: Vec<String>,

    /// Days ahead to scan for existing calendar events
    #[arg(long)]
    pub horizon_days: Option<i64>,
}

/// Arguments for the auth command.
#[derive(Debug, Args)]
pub struct AuthArgs {
    /// OAuth client ID (from Google Cloud Console)
    #[arg(long, env = "GOOGLE_CLIENT_ID")]
    pub client_id: Option<String>,

    /// OAuth client secret (from Google Cloud Console)
    #[arg(long, env = "GOOGLE_CLIENT_SECRET")]
    pub client_secret: Option<String>,

    /// Path to a Google Cloud Console credentials JSON file
    ///
    /// Alternative to providing client_id and client_secret separately.
    #[arg(long, env = "GOOGLE_CREDENTIALS_FILE")]
    pub credentials_file: Option<PathBuf>,

    /// Re-run the consent flow even if already authorized
    #[arg(long, short)]
    pub force: bool,
}

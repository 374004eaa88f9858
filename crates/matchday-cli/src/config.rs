//! Configuration loading.
//!
//! Settings come from a TOML file in the user config directory
//! (`~/.config/matchday/config.toml`), with the attendee list also
//! accepted from the `ATTENDEES` environment variable. Everything has a
//! working default except the Google OAuth credentials.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use matchday_core::DEFAULT_HORIZON_DAYS;
use matchday_providers::EmiratesConfig;
use matchday_providers::google::{GoogleConfig, OAuthCredentials};

/// Top-level configuration file structure.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Fixture source settings.
    pub source: SourceSettings,
    /// Google Calendar settings.
    pub google: Option<GoogleSettings>,
    /// Sync settings.
    pub sync: SyncSettings,
}

/// `[source]` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SourceSettings {
    /// URL of the fixtures listing page.
    pub fixtures_url: Option<String>,
    /// Seconds to wait before reading the page.
    pub pre_read_delay_secs: Option<u64>,
}

/// `[google]` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GoogleSettings {
    /// OAuth client ID.
    pub client_id: Option<String>,
    /// OAuth client secret.
    pub client_secret: Option<String>,
    /// Calendar to mirror into (defaults to "primary").
    pub calendar_id: Option<String>,
    /// Where OAuth tokens are persisted.
    pub token_path: Option<PathBuf>,
}

/// `[sync]` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SyncSettings {
    /// Attendee emails invited to created events.
    pub attendees: Vec<String>,
    /// Days ahead to scan for existing calendar events.
    pub horizon_days: Option<i64>,
}

impl AppConfig {
    /// Returns the default configuration file path.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("matchday")
            .join("config.toml")
    }

    /// Loads the configuration from the default path.
    ///
    /// A missing file is not an error; defaults apply.
    pub fn load() -> Result<Self, String> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Loads the configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("failed to read {}: {}", path.display(), e))?;
        toml::from_str(&content).map_err(|e| format!("failed to parse {}: {}", path.display(), e))
    }

    /// Builds the fixture source configuration.
    pub fn emirates_config(&self) -> EmiratesConfig {
        let mut config = EmiratesConfig::new();
        if let Some(ref url) = self.source.fixtures_url {
            config = config.with_fixtures_url(url);
        }
        if let Some(secs) = self.source.pre_read_delay_secs {
            config = config.with_pre_read_delay(Duration::from_secs(secs));
        }
        config
    }

    /// Builds the calendar mirror configuration.
    ///
    /// Fails when the OAuth client credentials are missing: they cannot be
    /// defaulted, Google requires a registered application.
    pub fn google_config(&self) -> Result<GoogleConfig, String> {
        let google = self.google.as_ref().ok_or_else(|| {
            format!(
                "no [google] section in {}; add client_id and client_secret",
                Self::default_path().display()
            )
        })?;

        let (Some(client_id), Some(client_secret)) =
            (google.client_id.as_ref(), google.client_secret.as_ref())
        else {
            return Err(
                "google.client_id and google.client_secret are both required".to_string(),
            );
        };

        let mut config = GoogleConfig::new(OAuthCredentials::new(client_id, client_secret));
        if let Some(ref id) = google.calendar_id {
            config = config.with_calendar_id(id);
        }
        if let Some(ref path) = google.token_path {
            config = config.with_token_path(path);
        }
        Ok(config)
    }

    /// Resolves the attendee list.
    ///
    /// Priority: CLI flag, then the `ATTENDEES` environment variable
    /// (comma-separated), then the config file. Empty entries are dropped.
    pub fn attendees(&self, cli: &[String], env: Option<&str>) -> Vec<String> {
        let from = if !cli.is_empty() {
            cli.to_vec()
        } else if let Some(env) = env {
            env.split(',').map(str::to_string).collect()
        } else {
            self.sync.attendees.clone()
        };

        from.into_iter()
            .map(|a| a.trim().to_string())
            .filter(|a| !a.is_empty())
            .collect()
    }

    /// Resolves the listing horizon.
    pub fn horizon(&self, cli_days: Option<i64>) -> chrono::Duration {
        let days = cli_days
            .or(self.sync.horizon_days)
            .unwrap_or(DEFAULT_HORIZON_DAYS);
        chrono::Duration::days(days)
    }
}

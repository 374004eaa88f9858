//! The auth command: one-time interactive calendar authorization.

use matchday_providers::google::{GoogleCalendarMirror, GoogleConfig, OAuthCredentials};

use crate::cli::AuthArgs;
use crate::config::{AppConfig, GoogleSettings};
use crate::error::{CliError, CliResult};

/// Runs the Google authorization flow.
///
/// Credentials resolve from CLI flags, a `--credentials-file`, or the
/// config file, in that order. The obtained tokens are persisted so
/// subsequent runs refresh without a browser.
pub async fn run(args: &AuthArgs, config: &AppConfig) -> CliResult<()> {
    let (client_id, client_secret, from_config) = resolve_credentials(args, config.google.as_ref())?;

    let credentials = OAuthCredentials::new(&client_id, &client_secret);
    credentials
        .validate()
        .map_err(|e| CliError::Config(format!("invalid Google credentials: {}", e)))?;

    let mut google_config = GoogleConfig::new(credentials);
    if let Some(ref google) = config.google {
        if let Some(ref id) = google.calendar_id {
            google_config = google_config.with_calendar_id(id);
        }
        if let Some(ref path) = google.token_path {
            google_config = google_config.with_token_path(path);
        }
    }

    let mirror = GoogleCalendarMirror::new(google_config)?;

    if mirror.is_authorized() && !args.force {
        println!("Already authorized with Google Calendar.");
        println!("Use --force to run the consent flow again.");
        return Ok(());
    }

    println!("Starting Google Calendar authorization...");
    println!();
    println!("A browser window will open for you to grant access.");
    println!("If it doesn't, copy the URL printed below into a browser.");
    println!();

    mirror.authorize().await?;

    println!();
    println!("Authorization successful!");
    println!("Tokens saved to {}.", mirror.token_path().display());
    if !from_config {
        println!();
        println!(
            "Add the credentials to {} so sync runs can find them:",
            AppConfig::default_path().display()
        );
        println!();
        println!("  [google]");
        println!("  client_id = \"{}\"", client_id);
        println!("  client_secret = \"{}\"", client_secret);
    }

    Ok(())
}

/// Resolves OAuth client credentials.
///
/// Priority: `--client-id`/`--client-secret` flags, then
/// `--credentials-file`, then the config file. The returned flag is `true`
/// when they came from the config file.
fn resolve_credentials(
    args: &AuthArgs,
    google: Option<&GoogleSettings>,
) -> CliResult<(String, String, bool)> {
    if let (Some(id), Some(secret)) = (&args.client_id, &args.client_secret) {
        return Ok((id.clone(), secret.clone(), false));
    }

    if let Some(ref path) = args.credentials_file {
        let creds = OAuthCredentials::from_file(path).map_err(|e| {
            CliError::Config(format!(
                "failed to load credentials from {}: {}",
                path.display(),
                e
            ))
        })?;
        return Ok((creds.client_id, creds.client_secret, false));
    }

    if let Some(google) = google
        && let (Some(id), Some(secret)) = (&google.client_id, &google.client_secret)
    {
        return Ok((id.clone(), secret.clone(), true));
    }

    if args.client_id.is_some() || args.client_secret.is_some() {
        return Err(CliError::Config(
            "both --client-id and --client-secret are required when providing credentials directly"
                .to_string(),
        ));
    }

    Err(CliError::Config(format!(
        "Google credentials are required. Provide them via:\n  \
         - client_id + client_secret in {}\n  \
         - --client-id and --client-secret flags\n  \
         - --credentials-file (path to a Google Cloud Console JSON)",
        AppConfig::default_path().display()
    )))
}

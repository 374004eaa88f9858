//! The calendar mirror.
//!
//! [`GoogleCalendarMirror`] is the only calendar surface the rest of the
//! system sees: list the upcoming window, create an event. Credential state
//! is an explicit object owned here: tokens load from the store at
//! construction and refresh on demand before each operation.

use chrono::{Duration, NaiveDateTime, Utc};
use matchday_core::{BoxFuture, CalendarWriter, Event, TimeWindow, WriteError};
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::error::{ProviderError, ProviderResult};

use super::client::CalendarClient;
use super::config::GoogleConfig;
use super::oauth::OAuthClient;
use super::tokens::TokenStore;

/// Google Calendar mirror: windowed reads and append-only writes against
/// one calendar.
pub struct GoogleCalendarMirror {
    config: GoogleConfig,
    token_store: TokenStore,
    oauth_client: OAuthClient,
    api_client: RwLock<Option<CalendarClient>>,
}

impl GoogleCalendarMirror {
    /// Creates a mirror with the given configuration.
    ///
    /// Loads any persisted tokens but does not start authentication; run
    /// [`authorize`](Self::authorize) for the one-time interactive grant.
    pub fn new(config: GoogleConfig) -> ProviderResult<Self> {
        config.validate().map_err(ProviderError::configuration)?;

        let token_store = TokenStore::new(&config.token_path);
        let _ = token_store.load();

        let oauth_client = OAuthClient::new(config.credentials.clone(), config.timeout);

        let api_client = token_store
            .get()
            .filter(|tokens| !tokens.is_expired())
            .map(|tokens| CalendarClient::new(&tokens.access_token, config.timeout));

        Ok(Self {
            config,
            token_store,
            oauth_client,
            api_client: RwLock::new(api_client),
        })
    }

    /// Returns `true` if usable credentials are present (a valid access
    /// token, or a refresh token to mint one).
    pub fn is_authorized(&self) -> bool {
        self.token_store
            .get()
            .is_some_and(|tokens| !tokens.is_expired() || tokens.refresh_token.is_some())
    }

    /// Runs the interactive consent flow and persists the obtained tokens.
    pub async fn authorize(&self) -> ProviderResult<()> {
        info!("starting calendar authorization");

        let tokens = self
            .oauth_client
            .authorize(&self.config.scopes, self.config.loopback_port_range)
            .await?;

        let client = CalendarClient::new(&tokens.access_token, self.config.timeout);
        self.token_store.set(tokens)?;
        *self.api_client.write().await = Some(client);

        info!("authorization successful");
        Ok(())
    }

    /// Returns the path where tokens are persisted.
    pub fn token_path(&self) -> &std::path::Path {
        self.token_store.path()
    }

    /// Lists events starting within `[now, now + horizon)`, in calendar
    /// chronological order.
    pub async fn list_upcoming_events(&self, horizon: Duration) -> ProviderResult<Vec<Event>> {
        self.ensure_authenticated().await?;

        let window = TimeWindow::from_now(Utc::now(), horizon);
        let client = self.api_client.read().await;
        let client = client
            .as_ref()
            .ok_or_else(|| ProviderError::internal("API client not available"))?;

        client.list_events(&self.config.calendar_id, &window).await
    }

    /// Schedules a new timed event in the mirrored calendar.
    pub async fn create_event(
        &self,
        summary: &str,
        start: NaiveDateTime,
        duration: Duration,
        attendees: &[String],
    ) -> ProviderResult<Event> {
        self.ensure_authenticated().await?;

        let client = self.api_client.read().await;
        let client = client
            .as_ref()
            .ok_or_else(|| ProviderError::internal("API client not available"))?;

        client
            .insert_event(&self.config.calendar_id, summary, start, duration, attendees)
            .await
    }

    /// Makes sure a client with a live access token exists, refreshing
    /// through the token endpoint when the stored one has expired.
    async fn ensure_authenticated(&self) -> ProviderResult<()> {
        let tokens = self.token_store.get().ok_or_else(|| {
            ProviderError::authentication("not authorized - run 'matchday auth' first")
        })?;

        if tokens.is_expired() {
            let refresh_token = tokens.refresh_token.as_ref().ok_or_else(|| {
                ProviderError::authentication(
                    "access token expired and no refresh token - run 'matchday auth' again",
                )
            })?;

            debug!("refreshing expired access token");
            let (access_token, expires_in) = self.oauth_client.refresh(refresh_token).await?;
            self.token_store
                .update_access_token(&access_token, expires_in)?;

            let mut client = self.api_client.write().await;
            match client.as_mut() {
                Some(c) => c.set_access_token(&access_token),
                None => {
                    *client = Some(CalendarClient::new(&access_token, self.config.timeout));
                }
            }
        } else {
            let mut client = self.api_client.write().await;
            if client.is_none() {
                *client = Some(CalendarClient::new(&tokens.access_token, self.config.timeout));
            }
        }

        Ok(())
    }
}

impl CalendarWriter for GoogleCalendarMirror {
    fn create_event<'a>(
        &'a self,
        summary: &'a str,
        start: NaiveDateTime,
        duration: Duration,
        attendees: &'a [String],
    ) -> BoxFuture<'a, Result<Event, WriteError>> {
        Box::pin(async move {
            GoogleCalendarMirror::create_event(self, summary, start, duration, attendees)
                .await
                .map_err(|e| Box::new(e) as WriteError)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::google::config::OAuthCredentials;
    use crate::google::tokens::TokenSet;

    fn test_config(token_path: &std::path::Path) -> GoogleConfig {
        let credentials =
            OAuthCredentials::new("test-client.apps.googleusercontent.com", "test-secret");
        GoogleConfig::new(credentials).with_token_path(token_path)
    }

    #[test]
    fn mirror_creation() {
        let tmp = tempfile::tempdir().unwrap();
        let mirror = GoogleCalendarMirror::new(test_config(&tmp.path().join("tokens.json")));
        assert!(mirror.is_ok());
    }

    #[test]
    fn mirror_rejects_invalid_config() {
        let credentials = OAuthCredentials::new("not-a-google-id", "secret");
        let config = GoogleConfig::new(credentials);
        assert!(GoogleCalendarMirror::new(config).is_err());
    }

    #[test]
    fn mirror_not_authorized_without_tokens() {
        let tmp = tempfile::tempdir().unwrap();
        let mirror =
            GoogleCalendarMirror::new(test_config(&tmp.path().join("tokens.json"))).unwrap();
        assert!(!mirror.is_authorized());
    }

    #[test]
    fn mirror_authorized_with_persisted_refresh_token() {
        let tmp = tempfile::tempdir().unwrap();
        let token_path = tmp.path().join("tokens.json");

        // Persist an expired access token with a refresh token, as a prior
        // run would have left behind.
        let store = TokenStore::new(&token_path);
        let mut tokens = TokenSet::new("stale", Some("refresh".to_string()), Some(3600));
        tokens.expires_at = Some(Utc::now() - Duration::hours(1));
        store.set(tokens).unwrap();

        let mirror = GoogleCalendarMirror::new(test_config(&token_path)).unwrap();
        assert!(mirror.is_authorized());
    }

    #[tokio::test]
    async fn unauthorized_mirror_fails_fatally() {
        let tmp = tempfile::tempdir().unwrap();
        let mirror =
            GoogleCalendarMirror::new(test_config(&tmp.path().join("tokens.json"))).unwrap();

        let err = mirror
            .list_upcoming_events(Duration::days(90))
            .await
            .unwrap_err();
        assert_eq!(err.code(), crate::ProviderErrorCode::AuthenticationFailed);
        assert!(err.is_fatal());
    }
}

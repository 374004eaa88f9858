//! OAuth token persistence.
//!
//! Tokens live in a JSON file under the user's data directory so that one
//! interactive authorization carries across runs. The store is the explicit
//! credential-state object: the mirror owns one and refreshes through it,
//! there is no process-global token state.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{ProviderError, ProviderResult};

/// Refresh this long before the reported expiry.
const EXPIRY_BUFFER_SECS: i64 = 60;

/// An access/refresh token pair from the OAuth token endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenSet {
    /// The bearer token for API requests.
    pub access_token: String,

    /// The long-lived token used to obtain new access tokens.
    pub refresh_token: Option<String>,

    /// When the access token expires (with the refresh buffer applied).
    pub expires_at: Option<DateTime<Utc>>,

    /// When the tokens were last obtained or refreshed.
    pub last_refresh: DateTime<Utc>,
}

impl TokenSet {
    /// Creates a token set from token-endpoint response data.
    pub fn new(
        access_token: impl Into<String>,
        refresh_token: Option<String>,
        expires_in_secs: Option<i64>,
    ) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token,
            expires_at: expires_in_secs.map(Self::expiry_from_now),
            last_refresh: Utc::now(),
        }
    }

    /// Returns `true` if the access token is expired or about to expire.
    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(expires_at) => Utc::now() >= expires_at,
            None => false,
        }
    }

    /// Replaces the access token after a refresh.
    pub fn update_access_token(
        &mut self,
        access_token: impl Into<String>,
        expires_in_secs: Option<i64>,
    ) {
        self.access_token = access_token.into();
        self.expires_at = expires_in_secs.map(Self::expiry_from_now);
        self.last_refresh = Utc::now();
    }

    fn expiry_from_now(secs: i64) -> DateTime<Utc> {
        Utc::now() + Duration::seconds(secs) - Duration::seconds(EXPIRY_BUFFER_SECS)
    }
}

/// File-backed token storage.
///
/// Writes go to a temp file first and are renamed into place, with 0600
/// permissions on Unix.
#[derive(Debug)]
pub struct TokenStore {
    path: PathBuf,
    tokens: RwLock<Option<TokenSet>>,
}

impl TokenStore {
    /// Creates a token store at the given path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            tokens: RwLock::new(None),
        }
    }

    /// Loads tokens from disk into memory.
    ///
    /// Returns `Ok(true)` if tokens were loaded, `Ok(false)` if no token
    /// file exists yet.
    pub fn load(&self) -> ProviderResult<bool> {
        if !self.path.exists() {
            debug!("no token file at {:?}", self.path);
            return Ok(false);
        }

        let content = fs::read_to_string(&self.path).map_err(|e| {
            ProviderError::configuration(format!("failed to read token file: {}", e))
        })?;

        let tokens: TokenSet = serde_json::from_str(&content).map_err(|e| {
            ProviderError::configuration(format!("failed to parse token file: {}", e))
        })?;

        info!("loaded tokens from {:?}", self.path);
        *self.tokens.write().unwrap() = Some(tokens);
        Ok(true)
    }

    /// Returns a clone of the current tokens, if any.
    pub fn get(&self) -> Option<TokenSet> {
        self.tokens.read().unwrap().clone()
    }

    /// Sets new tokens and persists them.
    pub fn set(&self, tokens: TokenSet) -> ProviderResult<()> {
        *self.tokens.write().unwrap() = Some(tokens);
        self.save()
    }

    /// Updates the access token after a refresh and persists.
    pub fn update_access_token(
        &self,
        access_token: impl Into<String>,
        expires_in_secs: Option<i64>,
    ) -> ProviderResult<()> {
        {
            let mut tokens = self.tokens.write().unwrap();
            match tokens.as_mut() {
                Some(t) => t.update_access_token(access_token, expires_in_secs),
                None => return Err(ProviderError::internal("no tokens to update")),
            }
        }
        self.save()
    }

    /// Returns `true` if tokens are loaded and carry a refresh token.
    pub fn has_refresh_token(&self) -> bool {
        self.tokens
            .read()
            .unwrap()
            .as_ref()
            .is_some_and(|t| t.refresh_token.is_some())
    }

    /// Returns the token storage path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn save(&self) -> ProviderResult<()> {
        let tokens = self.tokens.read().unwrap();
        let tokens = tokens
            .as_ref()
            .ok_or_else(|| ProviderError::internal("no tokens to save"))?;

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                ProviderError::configuration(format!("failed to create token directory: {}", e))
            })?;
        }

        let content = serde_json::to_string_pretty(tokens)
            .map_err(|e| ProviderError::internal(format!("failed to serialize tokens: {}", e)))?;

        let temp_path = self.path.with_extension("json.tmp");
        fs::write(&temp_path, &content).map_err(|e| {
            ProviderError::configuration(format!("failed to write token file: {}", e))
        })?;
        fs::rename(&temp_path, &self.path).map_err(|e| {
            ProviderError::configuration(format!("failed to rename token file: {}", e))
        })?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = fs::Permissions::from_mode(0o600);
            let _ = fs::set_permissions(&self.path, perms);
        }

        debug!("saved tokens to {:?}", self.path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_set_creation() {
        let tokens = TokenSet::new("access", Some("refresh".to_string()), Some(3600));
        assert_eq!(tokens.access_token, "access");
        assert_eq!(tokens.refresh_token, Some("refresh".to_string()));
        assert!(!tokens.is_expired());
    }

    #[test]
    fn token_set_expiry() {
        let mut tokens = TokenSet::new("access", None, Some(3600));
        tokens.expires_at = Some(Utc::now() - Duration::hours(1));
        assert!(tokens.is_expired());

        // A short-lived token inside the refresh buffer counts as expired.
        let tokens = TokenSet::new("access", None, Some(30));
        assert!(tokens.is_expired());
    }

    #[test]
    fn token_set_without_expiry_is_valid() {
        let tokens = TokenSet::new("access", None, None);
        assert!(!tokens.is_expired());
    }

    #[test]
    fn token_set_refresh_updates_expiry() {
        let mut tokens = TokenSet::new("old", Some("refresh".to_string()), Some(30));
        assert!(tokens.is_expired());

        tokens.update_access_token("new", Some(3600));
        assert_eq!(tokens.access_token, "new");
        assert_eq!(tokens.refresh_token, Some("refresh".to_string()));
        assert!(!tokens.is_expired());
    }

    #[test]
    fn store_save_and_load() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("tokens.json");

        let store = TokenStore::new(&path);
        store
            .set(TokenSet::new("access", Some("refresh".to_string()), Some(3600)))
            .unwrap();
        assert!(path.exists());

        let reloaded = TokenStore::new(&path);
        assert!(reloaded.load().unwrap());
        let tokens = reloaded.get().unwrap();
        assert_eq!(tokens.access_token, "access");
        assert!(reloaded.has_refresh_token());
    }

    #[test]
    fn store_load_without_file() {
        let tmp = tempfile::tempdir().unwrap();
        let store = TokenStore::new(tmp.path().join("missing.json"));
        assert!(!store.load().unwrap());
        assert!(store.get().is_none());
        assert!(!store.has_refresh_token());
    }

    #[test]
    fn store_creates_parent_directories() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("nested").join("dir").join("tokens.json");

        let store = TokenStore::new(&path);
        store.set(TokenSet::new("access", None, None)).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn store_update_access_token_persists() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("tokens.json");

        let store = TokenStore::new(&path);
        store
            .set(TokenSet::new("old", Some("refresh".to_string()), Some(3600)))
            .unwrap();
        store.update_access_token("new", Some(3600)).unwrap();

        let reloaded = TokenStore::new(&path);
        reloaded.load().unwrap();
        assert_eq!(reloaded.get().unwrap().access_token, "new");
    }

    #[test]
    fn store_update_without_tokens_fails() {
        let tmp = tempfile::tempdir().unwrap();
        let store = TokenStore::new(tmp.path().join("tokens.json"));
        assert!(store.update_access_token("new", None).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn store_sets_restrictive_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("tokens.json");

        let store = TokenStore::new(&path);
        store.set(TokenSet::new("access", None, None)).unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}

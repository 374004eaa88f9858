//! Google Calendar mirror.
//!
//! The calendar side of the sync: list the events already scheduled in the
//! next 90 days, create the missing ones. Authentication is entirely
//! internal to this boundary.
//!
//! # Authentication flow
//!
//! 1. The user provides their own OAuth client ID/secret (required by Google)
//! 2. `matchday auth` starts a local HTTP server and opens the browser to
//!    Google's consent page with a PKCE challenge
//! 3. Google redirects to the loopback server with the authorization code
//! 4. The code is exchanged for access and refresh tokens
//! 5. Tokens are persisted; subsequent runs refresh on demand, no browser
//!
//! # Example
//!
//! ```ignore
//! use matchday_providers::google::{GoogleCalendarMirror, GoogleConfig, OAuthCredentials};
//!
//! let credentials = OAuthCredentials::new(
//!     "your-client-id.apps.googleusercontent.com",
//!     "your-client-secret",
//! );
//! let mirror = GoogleCalendarMirror::new(GoogleConfig::new(credentials))?;
//!
//! if !mirror.is_authorized() {
//!     mirror.authorize().await?;
//! }
//!
//! let events = mirror.list_upcoming_events(chrono::Duration::days(90)).await?;
//! ```

mod client;
mod config;
mod mirror;
mod oauth;
mod tokens;

pub use config::{GoogleConfig, OAuthCredentials};
pub use mirror::GoogleCalendarMirror;
pub use oauth::OAuthClient;
pub use tokens::{TokenSet, TokenStore};

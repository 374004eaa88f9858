//! OAuth 2.0 authorization for the Google Calendar API.
//!
//! Implements the Authorization Code flow with PKCE (RFC 7636) and a
//! loopback redirect: a local HTTP server is started on a free port, the
//! user's browser is opened to Google's consent page, and the redirect
//! delivers the authorization code which is exchanged for tokens. This is
//! the one-time interactive step; afterwards [`OAuthClient::refresh`]
//! renews access tokens non-interactively.

use std::io::{BufRead, BufReader, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::Rng as _;
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

use crate::error::{ProviderError, ProviderResult};

use super::config::OAuthCredentials;
use super::tokens::TokenSet;

const AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

/// How long to wait for the user to complete the consent page.
const CONSENT_TIMEOUT: Duration = Duration::from_secs(300);

/// Length of the PKCE code verifier in bytes, before base64url encoding.
const VERIFIER_BYTES: usize = 32;

/// OAuth client: interactive authorization and token refresh.
#[derive(Debug)]
pub struct OAuthClient {
    credentials: OAuthCredentials,
    http_client: reqwest::Client,
}

impl OAuthClient {
    /// Creates an OAuth client with the given credentials.
    pub fn new(credentials: OAuthCredentials, timeout: Duration) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("failed to create HTTP client");

        Self {
            credentials,
            http_client,
        }
    }

    /// Runs the interactive consent flow and returns the obtained tokens.
    ///
    /// # Errors
    ///
    /// Fails if no loopback port is free, the user denies consent, the
    /// consent page times out, or the code exchange is rejected.
    pub async fn authorize(
        &self,
        scopes: &[String],
        port_range: (u16, u16),
    ) -> ProviderResult<TokenSet> {
        let pkce = Pkce::generate();

        let (listener, port) = bind_loopback(port_range)?;
        let redirect_uri = format!("http://127.0.0.1:{}/callback", port);

        let auth_url = self.consent_url(&pkce, &redirect_uri, scopes);
        info!("starting authorization flow, opening browser");
        debug!("consent URL: {}", auth_url);

        if let Err(e) = open::that(&auth_url) {
            warn!("failed to open browser: {}", e);
            eprintln!("\nOpen this URL in your browser to authorize:\n\n{}\n", auth_url);
        }

        let (code, state) = wait_for_redirect(listener)?;
        if state != pkce.state {
            return Err(ProviderError::authentication(
                "OAuth state mismatch in redirect",
            ));
        }

        info!("received authorization code, exchanging for tokens");
        self.exchange_code(&code, &pkce.verifier, &redirect_uri).await
    }

    /// Obtains a fresh access token using the refresh token.
    ///
    /// Returns the new access token and its lifetime in seconds.
    pub async fn refresh(&self, refresh_token: &str) -> ProviderResult<(String, Option<i64>)> {
        let params = [
            ("client_id", self.credentials.client_id.as_str()),
            ("client_secret", self.credentials.client_secret.as_str()),
            ("refresh_token", refresh_token),
            ("grant_type", "refresh_token"),
        ];

        let response: TokenResponse = self.token_request(&params, "token refresh").await?;
        info!("refreshed access token");
        Ok((response.access_token, response.expires_in))
    }

    async fn exchange_code(
        &self,
        code: &str,
        verifier: &str,
        redirect_uri: &str,
    ) -> ProviderResult<TokenSet> {
        let params = [
            ("client_id", self.credentials.client_id.as_str()),
            ("client_secret", self.credentials.client_secret.as_str()),
            ("code", code),
            ("code_verifier", verifier),
            ("grant_type", "authorization_code"),
            ("redirect_uri", redirect_uri),
        ];

        let response: TokenResponse = self.token_request(&params, "code exchange").await?;
        Ok(TokenSet::new(
            response.access_token,
            response.refresh_token,
            response.expires_in,
        ))
    }

    async fn token_request(
        &self,
        params: &[(&str, &str)],
        what: &str,
    ) -> ProviderResult<TokenResponse> {
        let response = self
            .http_client
            .post(TOKEN_URL)
            .form(params)
            .send()
            .await
            .map_err(|e| ProviderError::network(format!("{} request failed: {}", what, e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::network(format!("failed to read response: {}", e)))?;

        if !status.is_success() {
            return Err(ProviderError::authentication(format!(
                "{} failed ({}): {}",
                what, status, body
            )));
        }

        serde_json::from_str(&body).map_err(|e| {
            ProviderError::invalid_response(format!("invalid token response: {}", e))
        })
    }

    fn consent_url(&self, pkce: &Pkce, redirect_uri: &str, scopes: &[String]) -> String {
        format!(
            "{}?client_id={}&redirect_uri={}&response_type=code&scope={}&\
             code_challenge={}&code_challenge_method=S256&state={}&\
             access_type=offline&prompt=consent",
            AUTH_URL,
            urlencoding::encode(&self.credentials.client_id),
            urlencoding::encode(redirect_uri),
            urlencoding::encode(&scopes.join(" ")),
            urlencoding::encode(&pkce.challenge),
            urlencoding::encode(&pkce.state),
        )
    }
}

/// PKCE verifier/challenge pair plus the CSRF state parameter.
struct Pkce {
    verifier: String,
    challenge: String,
    state: String,
}

impl Pkce {
    fn generate() -> Self {
        let verifier = random_token(VERIFIER_BYTES);
        let challenge = Self::challenge_for(&verifier);
        Self {
            verifier,
            challenge,
            state: random_token(16),
        }
    }

    fn challenge_for(verifier: &str) -> String {
        URL_SAFE_NO_PAD.encode(Sha256::digest(verifier.as_bytes()))
    }
}

fn random_token(bytes: usize) -> String {
    let mut rng = rand::rng();
    let bytes: Vec<u8> = (0..bytes).map(|_| rng.random()).collect();
    URL_SAFE_NO_PAD.encode(&bytes)
}

/// Binds a listener on the first free port in the range.
fn bind_loopback(port_range: (u16, u16)) -> ProviderResult<(TcpListener, u16)> {
    for port in port_range.0..=port_range.1 {
        if let Ok(listener) = TcpListener::bind(("127.0.0.1", port)) {
            debug!("bound loopback server on port {}", port);
            return Ok((listener, port));
        }
    }
    Err(ProviderError::configuration(format!(
        "no free loopback port in range {}-{}",
        port_range.0, port_range.1
    )))
}

/// Waits for the browser redirect and returns `(code, state)`.
fn wait_for_redirect(listener: TcpListener) -> ProviderResult<(String, String)> {
    let (tx, rx) = mpsc::channel();

    thread::spawn(move || {
        for stream in listener.incoming() {
            match stream {
                Ok(stream) => {
                    if let Some(result) = answer_redirect(stream) {
                        let _ = tx.send(result);
                        return;
                    }
                }
                Err(e) => warn!("failed to accept redirect connection: {}", e),
            }
        }
    });

    match rx.recv_timeout(CONSENT_TIMEOUT) {
        Ok(result) => result,
        Err(mpsc::RecvTimeoutError::Timeout) => Err(ProviderError::authentication(
            "timed out waiting for the consent page",
        )),
        Err(mpsc::RecvTimeoutError::Disconnected) => {
            Err(ProviderError::internal("redirect listener stopped"))
        }
    }
}

/// Handles one connection on the loopback server.
///
/// Returns `None` for requests that are not the callback (favicon probes
/// and the like), so the accept loop keeps waiting.
fn answer_redirect(mut stream: TcpStream) -> Option<ProviderResult<(String, String)>> {
    let mut request_line = String::new();
    if BufReader::new(&stream).read_line(&mut request_line).is_err() {
        return None;
    }

    // Request line: GET /callback?code=...&state=... HTTP/1.1
    let path = match request_line.split_whitespace().collect::<Vec<_>>()[..] {
        ["GET", path, ..] if path.starts_with("/callback") => path,
        _ => return None,
    };

    let query = path.split_once('?').map(|(_, q)| q).unwrap_or("");
    let mut code = None;
    let mut state = None;
    let mut error = None;
    for param in query.split('&') {
        if let Some((key, value)) = param.split_once('=') {
            let value = urlencoding::decode(value).unwrap_or_default().into_owned();
            match key {
                "code" => code = Some(value),
                "state" => state = Some(value),
                "error" => error = Some(value),
                _ => {}
            }
        }
    }

    let page = if error.is_some() || code.is_none() {
        "HTTP/1.1 400 Bad Request\r\nContent-Type: text/html\r\n\r\n\
         <html><body><h1>Authorization failed</h1>\
         <p>You can close this window.</p></body></html>"
    } else {
        "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\n\r\n\
         <html><body><h1>Authorization successful</h1>\
         <p>You can close this window and return to the terminal.</p></body></html>"
    };
    let _ = stream.write_all(page.as_bytes());
    let _ = stream.flush();

    if let Some(error) = error {
        return Some(Err(ProviderError::authentication(format!(
            "authorization denied: {}",
            error
        ))));
    }
    match code {
        Some(code) => Some(Ok((code, state.unwrap_or_default()))),
        None => Some(Err(ProviderError::authentication(
            "redirect carried no authorization code",
        ))),
    }
}

/// Response from Google's token endpoint.
#[derive(Debug, serde::Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
}

//! Emirates fixture source configuration.

use std::time::Duration;

/// The venue's published home-fixtures page.
pub const DEFAULT_FIXTURES_URL: &str =
    "https://hospitality.arsenal.com/matchday-hospitality/arsenal-home-fixtures/";

/// Configuration for the Emirates fixture source.
#[derive(Debug, Clone)]
pub struct EmiratesConfig {
    /// URL of the fixtures listing page.
    pub fixtures_url: String,

    /// Delay observed before reading the page, allowing client-side
    /// rendering to settle.
    pub pre_read_delay: Duration,

    /// Request timeout.
    pub timeout: Duration,

    /// User agent string for page requests.
    pub user_agent: String,
}

impl EmiratesConfig {
    /// Default pre-read delay in seconds.
    pub const DEFAULT_PRE_READ_DELAY_SECS: u64 = 3;

    /// Default request timeout in seconds.
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

    /// Creates a configuration pointing at the venue's published page.
    pub fn new() -> Self {
        Self {
            fixtures_url: DEFAULT_FIXTURES_URL.to_string(),
            pre_read_delay: Duration::from_secs(Self::DEFAULT_PRE_READ_DELAY_SECS),
            timeout: Duration::from_secs(Self::DEFAULT_TIMEOUT_SECS),
            user_agent: format!("matchday/{}", env!("CARGO_PKG_VERSION")),
        }
    }

    /// Sets the fixtures page URL.
    pub fn with_fixtures_url(mut self, url: impl Into<String>) -> Self {
        self.fixtures_url = url.into();
        self
    }

    /// Sets the pre-read delay.
    pub fn with_pre_read_delay(mut self, delay: Duration) -> Self {
        self.pre_read_delay = delay;
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.fixtures_url.is_empty() {
            return Err("fixtures_url is required".to_string());
        }
        if !self.fixtures_url.starts_with("http://") && !self.fixtures_url.starts_with("https://")
        {
            return Err(format!(
                "fixtures_url must be an http(s) URL, got {:?}",
                self.fixtures_url
            ));
        }
        Ok(())
    }
}

impl Default for EmiratesConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = EmiratesConfig::new();
        assert_eq!(config.fixtures_url, DEFAULT_FIXTURES_URL);
        assert_eq!(config.pre_read_delay, Duration::from_secs(3));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn builder_methods() {
        let config = EmiratesConfig::new()
            .with_fixtures_url("https://example.com/fixtures")
            .with_pre_read_delay(Duration::from_secs(0))
            .with_timeout(Duration::from_secs(10));

        assert_eq!(config.fixtures_url, "https://example.com/fixtures");
        assert_eq!(config.pre_read_delay, Duration::ZERO);
        assert_eq!(config.timeout, Duration::from_secs(10));
    }

    #[test]
    fn validation_rejects_bad_urls() {
        let empty = EmiratesConfig::new().with_fixtures_url("");
        assert!(empty.validate().is_err());

        let not_http = EmiratesConfig::new().with_fixtures_url("ftp://example.com");
        assert!(not_http.validate().is_err());
    }
}

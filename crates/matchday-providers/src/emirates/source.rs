//! Fixture extraction from the venue's listing page.

use matchday_core::{BoxFuture, RawFixture};
use scraper::{Html, Selector};
use tracing::{debug, warn};

use crate::error::{ProviderError, ProviderResult};
use crate::source::FixtureSource;

use super::config::EmiratesConfig;

/// CSS selector of the content container holding the fixture list.
const CONTAINER_SELECTOR: &str = ".tab_contents";

/// CSS selector of one fixture item within the container.
const ITEM_SELECTOR: &str = "li";

/// The Emirates Stadium fixture source.
///
/// Implements [`FixtureSource`] by fetching the hospitality page and
/// extracting the raw text of each non-empty fixture item.
#[derive(Debug)]
pub struct EmiratesSource {
    config: EmiratesConfig,
    http_client: reqwest::Client,
}

impl EmiratesSource {
    /// Creates a new source with the given configuration.
    pub fn new(config: EmiratesConfig) -> ProviderResult<Self> {
        config.validate().map_err(ProviderError::configuration)?;

        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()
            .expect("failed to create HTTP client");

        Ok(Self {
            config,
            http_client,
        })
    }

    /// Fetches the listing page body.
    async fn fetch_page(&self) -> ProviderResult<String> {
        let response = self
            .http_client
            .get(&self.config.fixtures_url)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProviderError::network("fixtures page request timeout")
                } else {
                    ProviderError::network(format!("fixtures page request failed: {}", e))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::server(format!(
                "fixtures page returned {}",
                status
            )));
        }

        response
            .text()
            .await
            .map_err(|e| ProviderError::network(format!("failed to read fixtures page: {}", e)))
    }

    /// Extracts raw fixtures from the page HTML.
    ///
    /// Each item's text nodes are trimmed and joined with line breaks to
    /// reproduce the rendered layout: title line first, date line second.
    /// Items with no text at all (layout placeholders) are dropped.
    fn extract_fixtures(html: &str) -> ProviderResult<Vec<RawFixture>> {
        let container_selector =
            Selector::parse(CONTAINER_SELECTOR).expect("valid container selector");
        let item_selector = Selector::parse(ITEM_SELECTOR).expect("valid item selector");

        let document = Html::parse_document(html);

        let Some(container) = document.select(&container_selector).next() else {
            return Err(ProviderError::invalid_response(format!(
                "fixtures container {:?} not found on the page",
                CONTAINER_SELECTOR
            )));
        };

        let fixtures: Vec<RawFixture> = container
            .select(&item_selector)
            .filter_map(|item| {
                let text: Vec<&str> = item
                    .text()
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
                    .collect();
                if text.is_empty() {
                    None
                } else {
                    Some(RawFixture::new(text.join("\n")))
                }
            })
            .collect();

        debug!("extracted {} fixture items from the page", fixtures.len());
        Ok(fixtures)
    }
}

impl FixtureSource for EmiratesSource {
    fn name(&self) -> &str {
        "emirates"
    }

    fn list_fixtures(&self) -> BoxFuture<'_, ProviderResult<Vec<RawFixture>>> {
        Box::pin(async move {
            if !self.config.pre_read_delay.is_zero() {
                debug!(
                    "waiting {:?} for the page to settle",
                    self.config.pre_read_delay
                );
                tokio::time::sleep(self.config.pre_read_delay).await;
            }

            let html = self.fetch_page().await?;
            let fixtures = Self::extract_fixtures(&html)?;

            if fixtures.is_empty() {
                warn!("fixtures container present but held no items");
            }

            Ok(fixtures)
        })
    }
}

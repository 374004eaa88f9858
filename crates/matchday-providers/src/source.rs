//! FixtureSource trait definition.
//!
//! The listing mechanism is a black box behind this contract: whatever the
//! page layout or transport, a source yields the raw text of each fixture
//! item and nothing else. Date parsing rules live in the normalizer, so a
//! source-format change only ever touches the source adapter.

use matchday_core::{BoxFuture, RawFixture};

use crate::error::ProviderResult;

/// A provider of raw fixture records from an external listing.
pub trait FixtureSource: Send + Sync {
    /// Returns the name of this source (e.g. "emirates").
    fn name(&self) -> &str;

    /// Returns the upcoming fixtures as raw listing-item text, in the
    /// order the venue publishes them (assumed chronological).
    ///
    /// # Errors
    ///
    /// Returns a [`crate::ProviderError`] if the listing page cannot be
    /// fetched or does not contain the fixtures container.
    fn list_fixtures(&self) -> BoxFuture<'_, ProviderResult<Vec<RawFixture>>>;
}

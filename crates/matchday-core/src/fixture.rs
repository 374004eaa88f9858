//! Fixture types.
//!
//! A [`RawFixture`] is the unparsed text blob for one fixture as extracted
//! from the venue's listing page: a title line and a date line joined by a
//! line break. It is normalized into a [`Fixture`] and discarded.

use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::normalize::{self, ParseError};

/// Prefix used to derive an event summary from a fixture title.
///
/// The summary is the sole identity used for dedup against the calendar:
/// two entities are the same fixture iff their summaries are equal
/// (exact, case-sensitive).
pub const SUMMARY_PREFIX: &str = "Emirates: ";

/// One fixture as published by the venue, before normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawFixture {
    /// The raw text of the listing item. The first line is the fixture
    /// title; the second line is the kick-off date.
    pub display_text: String,
}

impl RawFixture {
    /// Creates a raw fixture from listing-item text.
    pub fn new(display_text: impl Into<String>) -> Self {
        Self {
            display_text: display_text.into(),
        }
    }

    /// Normalizes this raw fixture into a [`Fixture`].
    ///
    /// # Errors
    ///
    /// Returns [`ParseError`] if the text does not split into a title line
    /// and a date line, or if the date line does not match the expected
    /// kick-off format.
    pub fn normalize(&self) -> Result<Fixture, ParseError> {
        normalize::parse_fixture(&self.display_text)
    }
}

/// A scheduled fixture with a canonical kick-off time.
///
/// The kick-off is a naive timestamp understood to be venue-local
/// ([`crate::VENUE_TIME_ZONE`]) by convention of downstream consumers.
/// Created once per raw record; immutable thereafter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fixture {
    /// The fixture title, verbatim from the listing.
    pub title: String,
    /// Kick-off in venue-local wall-clock time.
    pub kickoff: NaiveDateTime,
}

impl Fixture {
    /// Creates a fixture from a title and kick-off time.
    pub fn new(title: impl Into<String>, kickoff: NaiveDateTime) -> Self {
        Self {
            title: title.into(),
            kickoff,
        }
    }

    /// Parses a fixture from raw listing-item text.
    ///
    /// Convenience for [`RawFixture::normalize`].
    pub fn parse(display_text: &str) -> Result<Self, ParseError> {
        normalize::parse_fixture(display_text)
    }

    /// Returns the calendar event summary for this fixture.
    pub fn event_summary(&self) -> String {
        format!("{SUMMARY_PREFIX}{}", self.title)
    }
}

impl fmt::Display for Fixture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.title, self.kickoff.format("%Y-%m-%dT%H:%M:%S"))
    }
}

//! Time helpers: the listing window and venue-local conventions.

use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// The fixed venue timezone. Kick-off times are naive wall-clock values
/// understood to be in this zone; it is attached explicitly on the wire
/// when events are created.
pub const VENUE_TIME_ZONE: &str = "Europe/London";

/// Default look-ahead when listing existing calendar events.
pub const DEFAULT_HORIZON_DAYS: i64 = 90;

/// A half-open interval `[start, end)` in UTC for querying calendar events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    /// Start of the window (inclusive).
    pub start: DateTime<Utc>,
    /// End of the window (exclusive).
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    /// Creates a new time window.
    ///
    /// # Panics
    ///
    /// Panics if `start` is after `end`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        assert!(start <= end, "TimeWindow start must be <= end");
        Self { start, end }
    }

    /// Creates a window starting at `now` extending the given duration.
    pub fn from_now(now: DateTime<Utc>, duration: Duration) -> Self {
        Self::new(now, now + duration)
    }

    /// Creates the default listing window: `[now, now + 90 days)`.
    pub fn horizon(now: DateTime<Utc>) -> Self {
        Self::from_now(now, Duration::days(DEFAULT_HORIZON_DAYS))
    }

    /// Returns the duration of this window.
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Checks if a datetime falls within this window.
    pub fn contains(&self, dt: DateTime<Utc>) -> bool {
        self.start <= dt && dt < self.end
    }
}

/// Formats a venue-local time for the calendar API.
///
/// The wire format is a bare `%Y-%m-%dT%H:%M:%S` datetime; the timezone
/// travels in the separate `timeZone` field of the request body.
pub fn to_api_datetime(dt: NaiveDateTime) -> String {
    dt.format("%Y-%m-%dT%H:%M:%S").to_string()
}

//! Calendar event types.
//!
//! [`Event`] is the calendar's view of a scheduled entry, owned by the
//! external calendar service. This system only reads and creates events,
//! never mutates existing ones; the sync engine consumes nothing beyond the
//! summary and start time.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// The start or end time of a calendar event.
///
/// Timed events carry a datetime with the offset the calendar service
/// reported it in; all-day events carry a bare date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum EventTime {
    /// A specific datetime, in the calendar's reported offset.
    DateTime(DateTime<FixedOffset>),
    /// An all-day event date (no specific time).
    AllDay(NaiveDate),
}

impl EventTime {
    /// Creates an `EventTime` from a datetime with offset.
    pub fn from_datetime(dt: DateTime<FixedOffset>) -> Self {
        Self::DateTime(dt)
    }

    /// Creates an `EventTime` from a date (all-day event).
    pub fn from_date(date: NaiveDate) -> Self {
        Self::AllDay(date)
    }

    /// Returns `true` if this is an all-day event time.
    pub fn is_all_day(&self) -> bool {
        matches!(self, Self::AllDay(_))
    }

    /// Returns the wall-clock time as the calendar reported it.
    ///
    /// Events created by this system carry venue-local times, so this is
    /// what kick-off times are compared against. All-day events have no
    /// wall-clock time.
    pub fn local_naive(&self) -> Option<NaiveDateTime> {
        match self {
            Self::DateTime(dt) => Some(dt.naive_local()),
            Self::AllDay(_) => None,
        }
    }
}

/// A calendar user (creator or organizer of an event).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventUser {
    /// The user's email address.
    pub email: Option<String>,
    /// The user's display name, if available.
    pub display_name: Option<String>,
}

/// An entry in the external calendar service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// The event title. Sole identity used for fixture dedup.
    pub summary: String,
    /// When the event starts.
    pub start: EventTime,
    /// When the event ends.
    pub end: EventTime,
    /// Who created the event.
    pub creator: Option<EventUser>,
    /// Who organizes the event.
    pub organizer: Option<EventUser>,
    /// The calendar service's color marker.
    pub color_id: Option<String>,
    /// A direct link to view this event in the calendar UI.
    pub html_link: Option<String>,
    /// When the event was created.
    pub created: Option<DateTime<Utc>>,
    /// When the event was last updated.
    pub updated: Option<DateTime<Utc>>,
}

impl Event {
    /// Creates an event with the minimum fields; the rest default to `None`.
    pub fn new(summary: impl Into<String>, start: EventTime, end: EventTime) -> Self {
        Self {
            summary: summary.into(),
            start,
            end,
            creator: None,
            organizer: None,
            color_id: None,
            html_link: None,
            created: None,
            updated: None,
        }
    }
}

//! Core types: fixtures, calendar events, normalization, sync engine

pub mod event;
pub mod fixture;
pub mod normalize;
pub mod sync;
pub mod time;

pub use event::{Event, EventTime, EventUser};
pub use fixture::{Fixture, RawFixture, SUMMARY_PREFIX};
pub use normalize::ParseError;
pub use sync::{
    BoxFuture, CalendarWriter, SyncEntry, SyncOutcome, SyncReport, WriteError, sync,
    EVENT_DURATION_HOURS,
};
pub use time::{to_api_datetime, TimeWindow, DEFAULT_HORIZON_DAYS, VENUE_TIME_ZONE};

//! The two I/O boundaries of the sync:
//!
//! - [`FixtureSource`] - produces raw fixture records from the venue's
//!   published listing ([`emirates`] is the concrete source)
//! - [`google`] - the calendar mirror: list existing events, create missing
//!   ones, with OAuth credential handling internal to the boundary
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐          ┌───────────────────┐
//! │  venue web page  │          │ Google Calendar   │
//! └────────┬─────────┘          └─────────┬─────────┘
//!          │                              │
//!          ▼                              ▼
//! ┌──────────────────┐          ┌───────────────────┐
//! │  EmiratesSource  │          │ GoogleCalendarMirror
//! └────────┬─────────┘          └─────────┬─────────┘
//!          │ RawFixture                   │ Event (read), CalendarWriter (write)
//!          ▼                              ▼
//!       normalize ──────► sync engine ◄───┘
//! ```

pub mod emirates;
pub mod error;
pub mod google;
pub mod source;

pub use emirates::{EmiratesConfig, EmiratesSource};
pub use error::{ProviderError, ProviderErrorCode, ProviderResult};
pub use source::FixtureSource;

//! Emirates Stadium fixture source.
//!
//! Fetches the venue's hospitality home-fixtures page and extracts one
//! [`matchday_core::RawFixture`] per non-empty listing item. The page is
//! rendered client-side, so a configurable pre-read delay (default 3
//! seconds) is observed before the read.
//!
//! This adapter is deliberately narrow: it knows where fixture items live
//! on the page and nothing about their date format.

mod config;
mod source;

pub use config::EmiratesConfig;
pub use source::EmiratesSource;

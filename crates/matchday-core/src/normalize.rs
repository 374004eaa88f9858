//! Fixture normalization.
//!
//! Converts the venue's free-text listing items into canonical [`Fixture`]
//! values. The date line looks like:
//!
//! ```text
//! Sat Jan 1 2020 | Kick-Off 3:00 PM
//! ```
//!
//! Normalization strips the `"| Kick-Off "` marker and parses the remainder
//! as an abbreviated weekday+month date with a 12-hour clock. No timezone is
//! attached at this stage; the result is venue-local wall-clock time.
//!
//! A parse failure is a signal that the source layout changed, so callers
//! abort the whole run rather than skip the record, since silent partial sync
//! would be worse than stopping.

use chrono::NaiveDateTime;
use thiserror::Error;

use crate::fixture::Fixture;

/// Marker separating the date from the kick-off time on the date line.
const KICKOFF_MARKER: &str = "| Kick-Off ";

/// chrono format of the date line once the marker and the leading weekday
/// abbreviation are removed, e.g. `"Jan 1 2020 3:00 PM"`.
const DATE_LINE_FORMAT: &str = "%b %d %Y %I:%M %p";

/// An error normalizing a raw fixture.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The display text did not contain both a title line and a date line.
    #[error("fixture text must contain a title line and a date line")]
    MissingDateLine,

    /// The title line was empty.
    #[error("fixture title is empty")]
    EmptyTitle,

    /// The date line did not carry the kick-off marker.
    #[error("date line {line:?} has no kick-off marker")]
    MissingKickoffMarker {
        /// The offending date line.
        line: String,
    },

    /// The date line did not parse as a kick-off date.
    #[error("unparseable kick-off date {line:?}: {source}")]
    InvalidDate {
        /// The offending date line.
        line: String,
        /// The underlying chrono error.
        #[source]
        source: chrono::ParseError,
    },
}

/// Parses one listing item into a [`Fixture`].
///
/// The first line is the title (non-empty, used verbatim); the second line
/// is the date line. Any further lines are ignored.
///
/// # Errors
///
/// Returns [`ParseError`] if the text has fewer than two lines, the title
/// is empty, or the date line does not match the expected pattern.
pub fn parse_fixture(display_text: &str) -> Result<Fixture, ParseError> {
    let mut lines = display_text.lines();
    let title = lines.next().ok_or(ParseError::MissingDateLine)?;
    let date_line = lines.next().ok_or(ParseError::MissingDateLine)?;

    if title.trim().is_empty() {
        return Err(ParseError::EmptyTitle);
    }

    if !date_line.contains(KICKOFF_MARKER) {
        return Err(ParseError::MissingKickoffMarker {
            line: date_line.to_string(),
        });
    }

    let cleaned = date_line.replace(KICKOFF_MARKER, "");
    let cleaned = cleaned.trim();
    // The leading weekday abbreviation is presentation only and is not
    // cross-checked against the date.
    let (_weekday, date_part) = cleaned.split_once(' ').unwrap_or(("", cleaned));

    let kickoff = NaiveDateTime::parse_from_str(date_part.trim(), DATE_LINE_FORMAT).map_err(
        |source| ParseError::InvalidDate {
            line: date_line.to_string(),
            source,
        },
    )?;

    Ok(Fixture::new(title, kickoff))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn naive(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    #[test]
    fn parses_title_and_kickoff() {
        let fixture =
            parse_fixture("Emirates A vs Emirates B\nSat Jan 1 2020 | Kick-Off 3:00 PM").unwrap();
        assert_eq!(fixture.title, "Emirates A vs Emirates B");
        assert_eq!(fixture.kickoff, naive(2020, 1, 1, 15, 0));
    }

    #[test]
    fn parses_morning_kickoff() {
        let fixture =
            parse_fixture("Arsenal vs Everton\nSun Dec 15 2024 | Kick-Off 11:30 AM").unwrap();
        assert_eq!(fixture.kickoff, naive(2024, 12, 15, 11, 30));
    }

    #[test]
    fn parses_noon_and_midnight_correctly() {
        let noon = parse_fixture("A vs B\nSat Feb 1 2025 | Kick-Off 12:00 PM").unwrap();
        assert_eq!(noon.kickoff, naive(2025, 2, 1, 12, 0));

        let midnight = parse_fixture("A vs B\nSat Feb 1 2025 | Kick-Off 12:00 AM").unwrap();
        assert_eq!(midnight.kickoff, naive(2025, 2, 1, 0, 0));
    }

    #[test]
    fn weekday_is_not_cross_checked_against_the_date() {
        // Jan 1 2020 was a Wednesday; the listed weekday is cosmetic.
        let fixture = parse_fixture("A vs B\nSat Jan 1 2020 | Kick-Off 3:00 PM").unwrap();
        assert_eq!(fixture.kickoff, naive(2020, 1, 1, 15, 0));
    }

    #[test]
    fn accepts_crlf_line_breaks() {
        let fixture =
            parse_fixture("Arsenal vs Spurs\r\nSun Sep 15 2024 | Kick-Off 4:30 PM").unwrap();
        assert_eq!(fixture.title, "Arsenal vs Spurs");
        assert_eq!(fixture.kickoff, naive(2024, 9, 15, 16, 30));
    }

    #[test]
    fn ignores_trailing_lines() {
        let fixture = parse_fixture(
            "Arsenal vs Brighton\nSat Mar 9 2024 | Kick-Off 3:00 PM\nHospitality from £299",
        )
        .unwrap();
        assert_eq!(fixture.title, "Arsenal vs Brighton");
        assert_eq!(fixture.kickoff, naive(2024, 3, 9, 15, 0));
    }

    #[test]
    fn single_line_is_rejected() {
        let err = parse_fixture("TitleOnly").unwrap_err();
        assert!(matches!(err, ParseError::MissingDateLine));
    }

    #[test]
    fn empty_text_is_rejected() {
        let err = parse_fixture("").unwrap_err();
        assert!(matches!(err, ParseError::MissingDateLine));
    }

    #[test]
    fn empty_title_is_rejected() {
        let err = parse_fixture("\nSat Jan 1 2020 | Kick-Off 3:00 PM").unwrap_err();
        // A leading blank line means the title line is empty, not missing.
        assert!(matches!(err, ParseError::EmptyTitle));
    }

    #[test]
    fn missing_marker_is_rejected() {
        let err = parse_fixture("Arsenal vs Chelsea\nSat Jan 1 2020 3:00 PM").unwrap_err();
        match err {
            ParseError::MissingKickoffMarker { line } => {
                assert_eq!(line, "Sat Jan 1 2020 3:00 PM");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn garbage_date_is_rejected() {
        let err =
            parse_fixture("Arsenal vs Chelsea\nSometime soon | Kick-Off whenever").unwrap_err();
        assert!(matches!(err, ParseError::InvalidDate { .. }));
    }

    #[test]
    fn twenty_four_hour_time_is_rejected() {
        // The listing always uses a 12-hour clock with an AM/PM marker.
        let err = parse_fixture("A vs B\nSat Jan 1 2020 | Kick-Off 15:00").unwrap_err();
        assert!(matches!(err, ParseError::InvalidDate { .. }));
    }
}

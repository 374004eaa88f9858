//! The sync engine.
//!
//! Given the normalized fixture list and a snapshot of existing calendar
//! events, computes the set of fixtures not yet represented and issues one
//! creation call per missing fixture through a [`CalendarWriter`].
//!
//! Identity is the event summary alone (`"Emirates: <title>"`, exact string
//! equality); no date comparison, no fuzzy title matching. A fixture whose
//! date changed but whose title is unchanged is treated as already synced;
//! the divergence is surfaced as a stale-date warning, never auto-corrected.
//!
//! Idempotence is the central correctness property: re-running against a
//! calendar already containing all prior creations performs zero writes.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;

use chrono::{Duration, NaiveDateTime};
use tracing::{info, warn};

use crate::event::Event;
use crate::fixture::Fixture;

/// Fixed duration of every created event.
pub const EVENT_DURATION_HOURS: i64 = 2;

/// A boxed future for object-safe async trait methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Error type accepted from a [`CalendarWriter`].
pub type WriteError = Box<dyn std::error::Error + Send + Sync>;

/// The write half of the calendar boundary, as seen by the sync engine.
///
/// Implementations schedule a new timed event and block until the backing
/// service responds. The engine never retries: a failed create is recorded
/// and the loop moves on to the next fixture.
pub trait CalendarWriter: Send + Sync {
    /// Schedules a new timed event.
    ///
    /// `start` is venue-local wall-clock time; the implementation is
    /// responsible for attaching the venue timezone on the wire.
    fn create_event<'a>(
        &'a self,
        summary: &'a str,
        start: NaiveDateTime,
        duration: Duration,
        attendees: &'a [String],
    ) -> BoxFuture<'a, Result<Event, WriteError>>;
}

/// What happened to a single fixture during a sync run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// A calendar event was created for this fixture.
    Created,
    /// An event with a matching summary already exists; no write occurred.
    Skipped {
        /// The existing event's start, when it diverges from the freshly
        /// parsed kick-off (venue reschedule leaving a stale entry).
        stale_start: Option<NaiveDateTime>,
    },
    /// The create call failed; the run continued with the next fixture.
    Failed {
        /// Why the create failed.
        reason: String,
    },
}

/// Per-fixture detail from a sync run, in source order.
#[derive(Debug, Clone)]
pub struct SyncEntry {
    /// The fixture this entry is about.
    pub fixture: Fixture,
    /// The computed event summary.
    pub summary: String,
    /// What happened.
    pub outcome: SyncOutcome,
}

/// The result of one full read-compare-create cycle.
#[derive(Debug, Clone, Default)]
pub struct SyncReport {
    /// Per-fixture outcomes, in the order the source provided them.
    pub entries: Vec<SyncEntry>,
}

impl SyncReport {
    /// Number of fixtures for which an event was created.
    pub fn created(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| e.outcome == SyncOutcome::Created)
            .count()
    }

    /// Number of fixtures already represented in the calendar.
    pub fn skipped(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| matches!(e.outcome, SyncOutcome::Skipped { .. }))
            .count()
    }

    /// Number of fixtures whose create call failed.
    pub fn failed(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| matches!(e.outcome, SyncOutcome::Failed { .. }))
            .count()
    }

    /// Number of skipped fixtures whose existing event start diverges from
    /// the freshly parsed kick-off.
    pub fn stale(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| {
                matches!(
                    e.outcome,
                    SyncOutcome::Skipped {
                        stale_start: Some(_)
                    }
                )
            })
            .count()
    }

    /// Returns `true` if any create call failed.
    pub fn has_failures(&self) -> bool {
        self.failed() > 0
    }

    /// Returns `true` if the source yielded no fixtures at all.
    ///
    /// Distinct from "all fixtures already synced": an empty run may mean
    /// the listing page layout changed and scraping silently found nothing.
    pub fn is_empty_run(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Runs one sync cycle.
///
/// Fixtures are processed in the order provided by the source (assumed
/// chronological; preserved for deterministic log output). Both input lists
/// are read-only snapshots for the duration of the run.
///
/// A failed create does not block subsequent fixtures; the failure is
/// recorded in the report and logged immediately.
pub async fn sync(
    fixtures: &[Fixture],
    existing: &[Event],
    attendees: &[String],
    writer: &dyn CalendarWriter,
) -> SyncReport {
    // First occurrence wins when the calendar holds duplicate summaries.
    let mut by_summary: HashMap<&str, &Event> = HashMap::with_capacity(existing.len());
    for event in existing {
        by_summary.entry(event.summary.as_str()).or_insert(event);
    }

    let mut entries = Vec::with_capacity(fixtures.len());
    for fixture in fixtures {
        let summary = fixture.event_summary();
        info!("processing {summary}");

        let outcome = match by_summary.get(summary.as_str()) {
            Some(event) => {
                let stale_start = event
                    .start
                    .local_naive()
                    .filter(|start| *start != fixture.kickoff);
                match stale_start {
                    Some(start) => warn!(
                        "{summary} already exists but its start {start} diverges from the \
                         listed kick-off {}; not updating",
                        fixture.kickoff
                    ),
                    None => info!("{summary} already exists and will be skipped"),
                }
                SyncOutcome::Skipped { stale_start }
            }
            None => {
                let result = writer
                    .create_event(
                        &summary,
                        fixture.kickoff,
                        Duration::hours(EVENT_DURATION_HOURS),
                        attendees,
                    )
                    .await;
                match result {
                    Ok(_) => {
                        info!("{summary} created");
                        SyncOutcome::Created
                    }
                    Err(err) => {
                        warn!("failed to create {summary}: {err}");
                        SyncOutcome::Failed {
                            reason: err.to_string(),
                        }
                    }
                }
            }
        };

        entries.push(SyncEntry {
            fixture: fixture.clone(),
            summary,
            outcome,
        });
    }

    SyncReport { entries }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventTime;
    use chrono::{FixedOffset, NaiveDate, TimeZone};
    use std::sync::Mutex;

    fn kickoff(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    fn fixture(title: &str, start: NaiveDateTime) -> Fixture {
        Fixture::new(title, start)
    }

    /// Builds a calendar event whose start matches a venue-local kick-off.
    fn mirrored_event(summary: &str, start: NaiveDateTime) -> Event {
        let offset = FixedOffset::east_opt(0).unwrap();
        let dt = offset.from_local_datetime(&start).unwrap();
        let end = offset
            .from_local_datetime(&(start + Duration::hours(EVENT_DURATION_HOURS)))
            .unwrap();
        Event::new(
            summary,
            EventTime::from_datetime(dt),
            EventTime::from_datetime(end),
        )
    }

    #[derive(Debug)]
    struct CreateCall {
        summary: String,
        start: NaiveDateTime,
        duration: Duration,
        attendees: Vec<String>,
    }

    /// Records create calls; fails those whose summary is in `fail_on`.
    #[derive(Default)]
    struct RecordingWriter {
        calls: Mutex<Vec<CreateCall>>,
        fail_on: Vec<String>,
    }

    impl RecordingWriter {
        fn failing_on(summaries: &[&str]) -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                fail_on: summaries.iter().map(|s| s.to_string()).collect(),
            }
        }

        fn calls(&self) -> Vec<CreateCall> {
            std::mem::take(&mut *self.calls.lock().unwrap())
        }
    }

    impl CalendarWriter for RecordingWriter {
        fn create_event<'a>(
            &'a self,
            summary: &'a str,
            start: NaiveDateTime,
            duration: Duration,
            attendees: &'a [String],
        ) -> BoxFuture<'a, Result<Event, WriteError>> {
            Box::pin(async move {
                self.calls.lock().unwrap().push(CreateCall {
                    summary: summary.to_string(),
                    start,
                    duration,
                    attendees: attendees.to_vec(),
                });
                if self.fail_on.iter().any(|s| s == summary) {
                    return Err("calendar backend returned HTTP 500".into());
                }
                Ok(mirrored_event(summary, start))
            })
        }
    }

    #[tokio::test]
    async fn idempotence_no_creates_when_all_mirrored() {
        let fixtures = vec![
            fixture("Arsenal vs Chelsea", kickoff(2024, 3, 9, 15)),
            fixture("Arsenal vs Spurs", kickoff(2024, 9, 15, 16)),
        ];
        let existing: Vec<Event> = fixtures
            .iter()
            .map(|f| mirrored_event(&f.event_summary(), f.kickoff))
            .collect();

        let writer = RecordingWriter::default();
        let report = sync(&fixtures, &existing, &[], &writer).await;

        assert!(writer.calls().is_empty());
        assert_eq!(report.created(), 0);
        assert_eq!(report.skipped(), 2);
        assert_eq!(report.stale(), 0);
        assert!(!report.has_failures());
        assert!(!report.is_empty_run());
    }

    #[tokio::test]
    async fn completeness_one_create_per_unmirrored_fixture() {
        let fixtures = vec![
            fixture("Arsenal vs Chelsea", kickoff(2024, 3, 9, 15)),
            fixture("Arsenal vs Spurs", kickoff(2024, 9, 15, 16)),
            fixture("Arsenal vs Liverpool", kickoff(2025, 1, 1, 20)),
        ];
        let attendees = vec!["fan@example.com".to_string()];

        let writer = RecordingWriter::default();
        let report = sync(&fixtures, &[], &attendees, &writer).await;

        let calls = writer.calls();
        assert_eq!(calls.len(), 3);
        for (call, f) in calls.iter().zip(&fixtures) {
            assert_eq!(call.summary, f.event_summary());
            assert_eq!(call.start, f.kickoff);
            assert_eq!(call.duration, Duration::hours(2));
            assert_eq!(call.attendees, attendees);
        }
        assert_eq!(report.created(), 3);
        assert_eq!(report.skipped(), 0);
    }

    #[tokio::test]
    async fn partial_match_skips_exactly_the_mirrored_fixtures() {
        let fixtures = vec![
            fixture("Arsenal vs Chelsea", kickoff(2024, 3, 9, 15)),
            fixture("Arsenal vs Spurs", kickoff(2024, 9, 15, 16)),
            fixture("Arsenal vs Liverpool", kickoff(2025, 1, 1, 20)),
        ];
        // Only the middle fixture is already mirrored.
        let existing = vec![mirrored_event(
            "Emirates: Arsenal vs Spurs",
            kickoff(2024, 9, 15, 16),
        )];

        let writer = RecordingWriter::default();
        let report = sync(&fixtures, &existing, &[], &writer).await;

        let created: Vec<String> = writer.calls().into_iter().map(|c| c.summary).collect();
        assert_eq!(
            created,
            vec![
                "Emirates: Arsenal vs Chelsea".to_string(),
                "Emirates: Arsenal vs Liverpool".to_string(),
            ]
        );
        assert_eq!(report.created(), 2);
        assert_eq!(report.skipped(), 1);
        assert!(matches!(
            report.entries[1].outcome,
            SyncOutcome::Skipped { stale_start: None }
        ));
    }

    #[tokio::test]
    async fn create_failure_does_not_short_circuit() {
        let fixtures = vec![
            fixture("Arsenal vs Chelsea", kickoff(2024, 3, 9, 15)),
            fixture("Arsenal vs Spurs", kickoff(2024, 9, 15, 16)),
            fixture("Arsenal vs Liverpool", kickoff(2025, 1, 1, 20)),
        ];

        let writer = RecordingWriter::failing_on(&["Emirates: Arsenal vs Spurs"]);
        let report = sync(&fixtures, &[], &[], &writer).await;

        assert_eq!(writer.calls().len(), 3);
        assert_eq!(report.created(), 2);
        assert_eq!(report.failed(), 1);
        assert!(report.has_failures());
        assert!(matches!(report.entries[0].outcome, SyncOutcome::Created));
        assert!(
            matches!(&report.entries[1].outcome, SyncOutcome::Failed { reason } if reason.contains("500"))
        );
        assert!(matches!(report.entries[2].outcome, SyncOutcome::Created));
    }

    #[tokio::test]
    async fn matching_summary_with_diverged_start_is_stale_skip() {
        let fixtures = vec![fixture("Arsenal vs Chelsea", kickoff(2024, 3, 10, 14))];
        // The calendar still holds the original slot.
        let existing = vec![mirrored_event(
            "Emirates: Arsenal vs Chelsea",
            kickoff(2024, 3, 9, 15),
        )];

        let writer = RecordingWriter::default();
        let report = sync(&fixtures, &existing, &[], &writer).await;

        assert!(writer.calls().is_empty());
        assert_eq!(report.skipped(), 1);
        assert_eq!(report.stale(), 1);
        assert!(matches!(
            report.entries[0].outcome,
            SyncOutcome::Skipped {
                stale_start: Some(start)
            } if start == kickoff(2024, 3, 9, 15)
        ));
    }

    #[tokio::test]
    async fn dedup_ignores_dates_entirely() {
        // Same summary, different time on both sides: still a plain skip
        // decision driven by the summary alone; the date only feeds the
        // stale marker.
        let fixtures = vec![fixture("Arsenal vs Chelsea", kickoff(2024, 3, 9, 15))];
        let existing = vec![mirrored_event(
            "Emirates: Arsenal vs Chelsea",
            kickoff(2024, 3, 9, 15),
        )];

        let writer = RecordingWriter::default();
        let report = sync(&fixtures, &existing, &[], &writer).await;
        assert_eq!(report.created(), 0);
        assert_eq!(report.stale(), 0);
    }

    #[tokio::test]
    async fn unrelated_events_do_not_match() {
        let fixtures = vec![fixture("Arsenal vs Chelsea", kickoff(2024, 3, 9, 15))];
        let existing = vec![
            mirrored_event("Dentist", kickoff(2024, 3, 9, 15)),
            // Same title without the prefix must not match.
            mirrored_event("Arsenal vs Chelsea", kickoff(2024, 3, 9, 15)),
        ];

        let writer = RecordingWriter::default();
        let report = sync(&fixtures, &existing, &[], &writer).await;
        assert_eq!(report.created(), 1);
        assert_eq!(report.skipped(), 0);
    }

    #[tokio::test]
    async fn empty_source_is_flagged_as_empty_run() {
        let writer = RecordingWriter::default();
        let report = sync(&[], &[], &[], &writer).await;

        assert!(report.is_empty_run());
        assert!(writer.calls().is_empty());
    }
}

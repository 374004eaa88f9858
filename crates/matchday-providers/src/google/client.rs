//! Google Calendar API v3 client.
//!
//! A thin HTTP client over the events collection: list the window of
//! upcoming events, insert a new one. Auth refresh lives a level up in
//! [`super::GoogleCalendarMirror`]; this client just carries a bearer token.

use std::time::Duration as StdDuration;

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};
use matchday_core::{to_api_datetime, Event, EventTime, EventUser, TimeWindow, VENUE_TIME_ZONE};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{ProviderError, ProviderResult};

/// Base URL for the Calendar API v3.
const API_BASE: &str = "https://www.googleapis.com/calendar/v3";

/// Color marker attached to every created event ("11" is red).
const EVENT_COLOR_ID: &str = "11";

/// Description attached to created events.
const EVENT_DESCRIPTION: &str = "Created by matchday";

/// Calendar API client bound to one access token.
#[derive(Debug)]
pub struct CalendarClient {
    http_client: reqwest::Client,
    access_token: String,
}

impl CalendarClient {
    /// Creates a client with the given access token.
    pub fn new(access_token: impl Into<String>, timeout: StdDuration) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("failed to create HTTP client");

        Self {
            http_client,
            access_token: access_token.into(),
        }
    }

    /// Replaces the access token (after a refresh).
    pub fn set_access_token(&mut self, token: impl Into<String>) {
        self.access_token = token.into();
    }

    /// Lists timed events in the window, in calendar chronological order.
    ///
    /// Recurring events are expanded into single occurrences; pagination is
    /// handled internally.
    pub async fn list_events(
        &self,
        calendar_id: &str,
        window: &TimeWindow,
    ) -> ProviderResult<Vec<Event>> {
        let url = format!(
            "{}/calendars/{}/events",
            API_BASE,
            urlencoding::encode(calendar_id)
        );

        let mut events = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self
                .http_client
                .get(&url)
                .bearer_auth(&self.access_token)
                .query(&[
                    ("timeMin", window.start.to_rfc3339()),
                    ("timeMax", window.end.to_rfc3339()),
                    ("singleEvents", "true".to_string()),
                    ("orderBy", "startTime".to_string()),
                ]);

            if let Some(ref token) = page_token {
                request = request.query(&[("pageToken", token.as_str())]);
            }

            let response = request.send().await.map_err(request_error)?;
            let page: EventListResponse = parse_response(response, "event list").await?;

            for item in page.items {
                match convert_event(item) {
                    Some(event) => events.push(event),
                    None => debug!("skipping event without a usable start time"),
                }
            }

            match page.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        debug!("fetched {} events from calendar {}", events.len(), calendar_id);
        Ok(events)
    }

    /// Schedules a new timed event.
    ///
    /// `start` is venue-local wall-clock time; the venue timezone travels in
    /// the request body's `timeZone` field.
    pub async fn insert_event(
        &self,
        calendar_id: &str,
        summary: &str,
        start: NaiveDateTime,
        duration: Duration,
        attendees: &[String],
    ) -> ProviderResult<Event> {
        let url = format!(
            "{}/calendars/{}/events",
            API_BASE,
            urlencoding::encode(calendar_id)
        );

        let body = InsertEventRequest::new(summary, start, duration, attendees);

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&self.access_token)
            .json(&body)
            .send()
            .await
            .map_err(request_error)?;

        let created: ApiEvent = parse_response(response, "event insert").await?;
        convert_event(created).ok_or_else(|| {
            ProviderError::invalid_response("created event came back without a start time")
        })
    }
}

/// Maps a reqwest error to a network error.
fn request_error(e: reqwest::Error) -> ProviderError {
    if e.is_timeout() {
        ProviderError::network("request timeout")
    } else if e.is_connect() {
        ProviderError::network(format!("connection failed: {}", e))
    } else {
        ProviderError::network(format!("request failed: {}", e))
    }
}

/// Checks the status and deserializes a successful response body.
async fn parse_response<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
    what: &str,
) -> ProviderResult<T> {
    let status = response.status();

    if status == reqwest::StatusCode::UNAUTHORIZED
        || status == reqwest::StatusCode::FORBIDDEN
    {
        return Err(ProviderError::authentication(
            "access token expired or rejected",
        ));
    }
    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        return Err(ProviderError::rate_limited("rate limit exceeded"));
    }
    if status == reqwest::StatusCode::NOT_FOUND {
        return Err(ProviderError::not_found(format!("{}: calendar not found", what)));
    }
    if status == reqwest::StatusCode::BAD_REQUEST {
        let body = response.text().await.unwrap_or_default();
        return Err(ProviderError::bad_request(format!(
            "{} rejected: {}",
            what, body
        )));
    }
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ProviderError::server(format!(
            "{} failed ({}): {}",
            what, status, body
        )));
    }

    let body = response
        .text()
        .await
        .map_err(|e| ProviderError::network(format!("failed to read response: {}", e)))?;

    serde_json::from_str(&body)
        .map_err(|e| ProviderError::invalid_response(format!("failed to parse {}: {}", what, e)))
}

/// Converts an API event into the core read-model.
///
/// Cancelled placeholders and events without any start are dropped.
fn convert_event(event: ApiEvent) -> Option<Event> {
    if event.status.as_deref() == Some("cancelled") {
        return None;
    }

    let start = convert_time(event.start?)?;
    let end = event.end.and_then(convert_time).unwrap_or_else(|| start.clone());

    let mut converted = Event::new(event.summary.unwrap_or_default(), start, end);
    converted.creator = event.creator.map(convert_user);
    converted.organizer = event.organizer.map(convert_user);
    converted.color_id = event.color_id;
    converted.html_link = event.html_link;
    converted.created = event.created.and_then(parse_utc);
    converted.updated = event.updated.and_then(parse_utc);
    Some(converted)
}

fn convert_time(time: ApiEventTime) -> Option<EventTime> {
    if let Some(dt) = time.date_time {
        let parsed = DateTime::parse_from_rfc3339(&dt)
            .map_err(|e| warn!("unparseable event time {:?}: {}", dt, e))
            .ok()?;
        return Some(EventTime::from_datetime(parsed));
    }
    if let Some(date) = time.date {
        let parsed = NaiveDate::parse_from_str(&date, "%Y-%m-%d")
            .map_err(|e| warn!("unparseable event date {:?}: {}", date, e))
            .ok()?;
        return Some(EventTime::from_date(parsed));
    }
    None
}

fn convert_user(user: ApiUser) -> EventUser {
    EventUser {
        email: user.email,
        display_name: user.display_name,
    }
}

fn parse_utc(value: String) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(&value)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Request body for the events insert endpoint.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InsertEventRequest {
    summary: String,
    description: String,
    start: InsertEventTime,
    end: InsertEventTime,
    color_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    attendees: Option<Vec<InsertAttendee>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InsertEventTime {
    date_time: String,
    time_zone: String,
}

#[derive(Debug, Serialize)]
struct InsertAttendee {
    email: String,
}

impl InsertEventRequest {
    fn new(summary: &str, start: NaiveDateTime, duration: Duration, attendees: &[String]) -> Self {
        let attendees = if attendees.is_empty() {
            None
        } else {
            Some(
                attendees
                    .iter()
                    .map(|email| InsertAttendee {
                        email: email.clone(),
                    })
                    .collect(),
            )
        };

        Self {
            summary: summary.to_string(),
            description: EVENT_DESCRIPTION.to_string(),
            start: InsertEventTime::venue_local(start),
            end: InsertEventTime::venue_local(start + duration),
            color_id: EVENT_COLOR_ID.to_string(),
            attendees,
        }
    }
}

impl InsertEventTime {
    fn venue_local(dt: NaiveDateTime) -> Self {
        Self {
            date_time: to_api_datetime(dt),
            time_zone: VENUE_TIME_ZONE.to_string(),
        }
    }
}

/// Response from the events list endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EventListResponse {
    #[serde(default)]
    items: Vec<ApiEvent>,
    next_page_token: Option<String>,
}

/// A single event from the API.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiEvent {
    summary: Option<String>,
    status: Option<String>,
    start: Option<ApiEventTime>,
    end: Option<ApiEventTime>,
    creator: Option<ApiUser>,
    organizer: Option<ApiUser>,
    color_id: Option<String>,
    html_link: Option<String>,
    created: Option<String>,
    updated: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiEventTime {
    date: Option<String>,
    date_time: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiUser {
    email: Option<String>,
    display_name: Option<String>,
}

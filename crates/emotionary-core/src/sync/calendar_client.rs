//! Google Calendar API client.
//!
//! Wraps event create/list/delete on one calendar. Every call requires an
//! authenticated credential from the lifecycle. There is no silent retry:
//! a retried create would mirror the same entry twice.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use reqwest::Client;
use serde_json::json;

use crate::auth::CredentialLifecycle;
use crate::storage::Config;
use crate::sync::event_codec::OWNERSHIP_MARKER;
use crate::sync::types::{EventDraft, RemoteEvent, SyncError, TimeRange};

/// Remote calendar operations, as the coordinator sees them.
pub trait RemoteCalendar: Send + Sync {
    /// Create an event, returning the calendar-assigned id. Single call,
    /// failure surfaced verbatim.
    fn create_event(&self, draft: &EventDraft) -> Result<String, SyncError>;

    /// List application-owned events in the range (defaulted when `None`).
    fn list_events(&self, range: Option<TimeRange>) -> Result<Vec<RemoteEvent>, SyncError>;

    /// Delete an event. Deleting an id that is already gone is success.
    fn delete_event(&self, remote_id: &str) -> Result<(), SyncError>;
}

const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/calendar/v3";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Google Calendar API client.
pub struct CalendarClient {
    auth: Arc<CredentialLifecycle>,
    base_url: String,
    calendar_id: String,
    lookback_days: i64,
    lookahead_days: i64,
}

impl CalendarClient {
    pub fn new(auth: Arc<CredentialLifecycle>, config: &Config) -> Self {
        Self {
            auth,
            base_url: DEFAULT_BASE_URL.to_string(),
            calendar_id: config.sync.calendar_id.clone(),
            lookback_days: config.sync.lookback_days,
            lookahead_days: config.sync.lookahead_days,
        }
    }

    /// Point the client at a different API root (tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn is_authenticated(&self) -> bool {
        self.auth.is_authenticated()
    }

    fn token(&self) -> Result<String, SyncError> {
        self.auth
            .access_token()
            .map_err(|_| SyncError::NotAuthenticated)
    }
}

impl RemoteCalendar for CalendarClient {
    fn create_event(&self, draft: &EventDraft) -> Result<String, SyncError> {
        let token = self.token()?;
        let url = format!("{}/calendars/{}/events", self.base_url, self.calendar_id);

        let body = json!({
            "summary": draft.subject,
            "description": draft.body,
            "start": {
                "dateTime": draft.start_time.to_rfc3339(),
                "timeZone": "UTC",
            },
            "end": {
                "dateTime": draft.end_time.to_rfc3339(),
                "timeZone": "UTC",
            },
        });

        let (status, text) = tokio::runtime::Handle::current()
            .block_on(async {
                let resp = Client::new()
                    .post(&url)
                    .bearer_auth(&token)
                    .timeout(REQUEST_TIMEOUT)
                    .json(&body)
                    .send()
                    .await?;
                let status = resp.status();
                let text = resp.text().await?;
                Ok::<_, reqwest::Error>((status, text))
            })
            .map_err(remote_unavailable)?;

        if !status.is_success() {
            return Err(SyncError::RemoteRejected {
                status: status.as_u16(),
                message: text,
            });
        }

        let response: serde_json::Value =
            serde_json::from_str(&text).map_err(|e| SyncError::RemoteRejected {
                status: status.as_u16(),
                message: format!("invalid response body: {e}"),
            })?;

        response["id"]
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| SyncError::RemoteRejected {
                status: status.as_u16(),
                message: "missing event id in response".to_string(),
            })
    }

    fn list_events(&self, range: Option<TimeRange>) -> Result<Vec<RemoteEvent>, SyncError> {
        let token = self.token()?;
        let range = range
            .unwrap_or_else(|| TimeRange::around_now(self.lookback_days, self.lookahead_days));

        let url = format!(
            "{}/calendars/{}/events?timeMin={}&timeMax={}&singleEvents=true&orderBy=startTime",
            self.base_url,
            self.calendar_id,
            urlencoding::encode(&range.start.to_rfc3339()),
            urlencoding::encode(&range.end.to_rfc3339()),
        );

        let (status, text) = tokio::runtime::Handle::current()
            .block_on(async {
                let resp = Client::new()
                    .get(&url)
                    .bearer_auth(&token)
                    .timeout(REQUEST_TIMEOUT)
                    .send()
                    .await?;
                let status = resp.status();
                let text = resp.text().await?;
                Ok::<_, reqwest::Error>((status, text))
            })
            .map_err(remote_unavailable)?;

        if !status.is_success() {
            return Err(SyncError::RemoteRejected {
                status: status.as_u16(),
                message: text,
            });
        }

        let response: serde_json::Value =
            serde_json::from_str(&text).map_err(|e| SyncError::RemoteRejected {
                status: status.as_u16(),
                message: format!("invalid response body: {e}"),
            })?;

        let items = response["items"].as_array().cloned().unwrap_or_default();

        Ok(items
            .iter()
            .filter_map(parse_remote_event)
            .filter(|event| event.body.contains(OWNERSHIP_MARKER))
            .collect())
    }

    fn delete_event(&self, remote_id: &str) -> Result<(), SyncError> {
        let token = self.token()?;
        let url = format!(
            "{}/calendars/{}/events/{}",
            self.base_url, self.calendar_id, remote_id
        );

        let status = tokio::runtime::Handle::current()
            .block_on(async {
                let resp = Client::new()
                    .delete(&url)
                    .bearer_auth(&token)
                    .timeout(REQUEST_TIMEOUT)
                    .send()
                    .await?;
                Ok::<_, reqwest::Error>(resp.status())
            })
            .map_err(remote_unavailable)?;

        // already-gone ids count as deleted
        if status.is_success() || status.as_u16() == 404 || status.as_u16() == 410 {
            Ok(())
        } else {
            Err(SyncError::RemoteRejected {
                status: status.as_u16(),
                message: "delete failed".to_string(),
            })
        }
    }
}

fn remote_unavailable(e: reqwest::Error) -> SyncError {
    SyncError::RemoteUnavailable(e.to_string())
}

/// Map one API item to a [`RemoteEvent`]. Items without an id or parseable
/// times are dropped.
fn parse_remote_event(item: &serde_json::Value) -> Option<RemoteEvent> {
    let remote_id = item["id"].as_str()?;
    let start_time = parse_event_time(&item["start"])?;
    let end_time = parse_event_time(&item["end"])?;

    Some(RemoteEvent {
        remote_id: remote_id.to_string(),
        subject: item["summary"].as_str().unwrap_or("").to_string(),
        body: item["description"].as_str().unwrap_or("").to_string(),
        start_time,
        end_time,
    })
}

/// Timed events carry `dateTime`; all-day events only `date`.
fn parse_event_time(value: &serde_json::Value) -> Option<DateTime<Utc>> {
    if let Some(raw) = value["dateTime"].as_str() {
        return DateTime::parse_from_rfc3339(raw)
            .ok()
            .map(|t| t.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(value["date"].as_str()?, "%Y-%m-%d").ok()?;
    Some(Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0)?))
}

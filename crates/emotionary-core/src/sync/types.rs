//! Core types for calendar mirroring.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::entry::Entry;
use crate::error::StoreError;

/// A generic event as it exists in the external calendar.
///
/// Produced only by the calendar client; consumed only by the codec.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteEvent {
    pub remote_id: String,
    pub subject: String,
    pub body: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

/// A calendar event about to be created (no id yet).
#[derive(Debug, Clone, PartialEq)]
pub struct EventDraft {
    pub subject: String,
    pub body: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

/// Inclusive time window for event listing.
#[derive(Debug, Clone, Copy)]
pub struct TimeRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeRange {
    /// The window around now used when the caller gives no range.
    pub fn around_now(lookback_days: i64, lookahead_days: i64) -> Self {
        let now = Utc::now();
        Self {
            start: now - Duration::days(lookback_days),
            end: now + Duration::days(lookahead_days),
        }
    }
}

/// Where a timeline item came from.
///
/// `remote_id` is a non-owning back-reference kept only so the caller can
/// delete the mirrored event later; it is never used for identity
/// comparison against local entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "from")]
pub enum TimelineSource {
    Local { id: i64 },
    Remote { remote_id: String },
}

/// One item in the merged local+remote timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineItem {
    pub entry: Entry,
    pub source: TimelineSource,
}

impl TimelineItem {
    pub fn remote_id(&self) -> Option<&str> {
        match &self.source {
            TimelineSource::Remote { remote_id } => Some(remote_id),
            TimelineSource::Local { .. } => None,
        }
    }
}

/// What happened to the calendar mirror of a write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum MirrorStatus {
    /// The entry was mirrored; the calendar assigned this id.
    Mirrored { remote_id: String },
    /// Not authenticated; no mirror was attempted.
    SkippedNotAuthenticated,
    /// The mirror call failed; the local write stands.
    Failed { reason: String },
}

/// Outcome of a diary write: the local insert always succeeded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WriteOutcome {
    pub entry_id: i64,
    pub mirror: MirrorStatus,
}

/// Sync error types.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// Local store failure. Fatal to the operation, surfaced immediately.
    #[error("diary store error: {0}")]
    Persistence(#[from] StoreError),

    /// A remote call was attempted without a valid credential.
    #[error("not authenticated with Google Calendar")]
    NotAuthenticated,

    /// Network-level failure reaching the calendar.
    #[error("calendar unavailable: {0}")]
    RemoteUnavailable(String),

    /// The calendar answered with an API-level error.
    #[error("calendar rejected request ({status}): {message}")]
    RemoteRejected { status: u16, message: String },
}

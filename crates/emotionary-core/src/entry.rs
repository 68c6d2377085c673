//! Diary entry types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of diary entry.
///
/// The marker token is the stable discriminator written into mirrored
/// calendar event subjects; it must stay bit-exact for interop with
/// events mirrored by earlier versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    Song,
    Photo,
}

impl EntryKind {
    /// Marker token for calendar event subjects.
    pub fn marker(&self) -> &'static str {
        match self {
            EntryKind::Song => "\u{1F3B5}",
            EntryKind::Photo => "\u{1F4F7}",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EntryKind::Song => "song",
            EntryKind::Photo => "photo",
        }
    }
}

/// A diary entry: a recognized song or a captured photo.
///
/// `media_ref` is an opaque reference to the photo bytes. It is never
/// embedded in a mirrored calendar event, so entries decoded back from the
/// calendar carry `None` there.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Entry {
    Song {
        title: String,
        artist: Option<String>,
        listened_at: DateTime<Utc>,
    },
    Photo {
        label: Option<String>,
        taken_at: DateTime<Utc>,
        media_ref: Option<String>,
    },
}

impl Entry {
    pub fn kind(&self) -> EntryKind {
        match self {
            Entry::Song { .. } => EntryKind::Song,
            Entry::Photo { .. } => EntryKind::Photo,
        }
    }

    /// When the entry occurred (listened / taken), as opposed to when it
    /// was recorded.
    pub fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            Entry::Song { listened_at, .. } => *listened_at,
            Entry::Photo { taken_at, .. } => *taken_at,
        }
    }
}

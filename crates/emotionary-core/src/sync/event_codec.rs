//! Encoding/decoding between diary entries and calendar events.
//!
//! The grammar is fixed: it must stay bit-exact so events mirrored by any
//! earlier version keep decoding.
//!
//! - Song subject: `🎵 <title>`; body `Artist: <artist>` (when known)
//!   followed by `Listened via E-Motionary`.
//! - Photo subject: `📷 Photo`; body `Photo taken via E-Motionary`
//!   followed by `Label: <label>` (when present).
//!
//! Only events whose body contains the ownership marker belong to this
//! application; everything else decodes to `None`, never an error.

use chrono::Duration;

use crate::entry::{Entry, EntryKind};
use crate::sync::types::{EventDraft, RemoteEvent};

/// The literal substring marking an event as ours.
pub const OWNERSHIP_MARKER: &str = "via E-Motionary";

const SONG_BODY_LINE: &str = "Listened via E-Motionary";
const PHOTO_BODY_LINE: &str = "Photo taken via E-Motionary";
const ARTIST_KEY: &str = "Artist: ";
const LABEL_KEY: &str = "Label: ";

/// The calendar needs a non-zero interval; mirrored events span one minute.
const MIRROR_EVENT_MINUTES: i64 = 1;

/// Encode an entry as a calendar event draft.
///
/// `media_ref` is deliberately left out: the calendar is a secondary index,
/// not custody of the photo bytes.
pub fn encode(entry: &Entry) -> EventDraft {
    let start_time = entry.occurred_at();
    let end_time = start_time + Duration::minutes(MIRROR_EVENT_MINUTES);

    match entry {
        Entry::Song { title, artist, .. } => {
            let body = match artist {
                Some(artist) => format!("{ARTIST_KEY}{artist}\n{SONG_BODY_LINE}"),
                None => SONG_BODY_LINE.to_string(),
            };
            EventDraft {
                subject: format!("{} {}", EntryKind::Song.marker(), title),
                body,
                start_time,
                end_time,
            }
        }
        Entry::Photo { label, .. } => {
            let body = match label {
                Some(label) => format!("{PHOTO_BODY_LINE}\n{LABEL_KEY}{label}"),
                None => PHOTO_BODY_LINE.to_string(),
            };
            EventDraft {
                subject: format!("{} Photo", EntryKind::Photo.marker()),
                body,
                start_time,
                end_time,
            }
        }
    }
}

/// Decode a calendar event back into an entry.
///
/// `None` means "not ours": the ownership marker is absent, the subject
/// carries neither kind marker, or the subject is malformed. When both
/// markers appear, Song wins.
pub fn decode(event: &RemoteEvent) -> Option<Entry> {
    if !event.body.contains(OWNERSHIP_MARKER) {
        return None;
    }

    if let Some((_, after)) = event.subject.split_once(EntryKind::Song.marker()) {
        let title = after.trim();
        if title.is_empty() {
            return None;
        }
        return Some(Entry::Song {
            title: title.to_string(),
            artist: extract_field(&event.body, ARTIST_KEY),
            listened_at: event.start_time,
        });
    }

    if event.subject.contains(EntryKind::Photo.marker()) {
        return Some(Entry::Photo {
            label: extract_field(&event.body, LABEL_KEY),
            taken_at: event.start_time,
            media_ref: None,
        });
    }

    None
}

/// Value after the literal key, up to the next newline, trimmed.
///
/// Total: a missing key yields `None`, never an index error.
fn extract_field(body: &str, key: &str) -> Option<String> {
    let (_, rest) = body.split_once(key)?;
    let value = rest.lines().next().unwrap_or("").trim();
    Some(value.to_string())
}

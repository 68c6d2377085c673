//! Write mirroring and timeline merging.
//!
//! The coordinator owns no state: it borrows the diary store, the
//! credential lifecycle, and the calendar client for the duration of each
//! call. Writes are local-first; the mirror is best-effort and its failure
//! never rolls back a local write.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::auth::CredentialLifecycle;
use crate::entry::Entry;
use crate::storage::DiaryStore;
use crate::sync::calendar_client::RemoteCalendar;
use crate::sync::event_codec;
use crate::sync::types::{MirrorStatus, SyncError, TimelineItem, TimelineSource, WriteOutcome};

pub struct SyncCoordinator {
    store: Arc<DiaryStore>,
    auth: Arc<CredentialLifecycle>,
    calendar: Arc<dyn RemoteCalendar>,
}

impl SyncCoordinator {
    pub fn new(
        store: Arc<DiaryStore>,
        auth: Arc<CredentialLifecycle>,
        calendar: Arc<dyn RemoteCalendar>,
    ) -> Self {
        Self {
            store,
            auth,
            calendar,
        }
    }

    /// Record a song. The local insert must succeed; the calendar mirror is
    /// attempted only when authenticated and its failure is reported in the
    /// outcome, never as an error.
    pub fn write_song(
        &self,
        title: &str,
        artist: Option<&str>,
        occurred_at: DateTime<Utc>,
    ) -> Result<WriteOutcome, SyncError> {
        let entry_id = self.store.insert_song(title, artist, occurred_at)?;
        let entry = Entry::Song {
            title: title.to_string(),
            artist: artist.map(String::from),
            listened_at: occurred_at,
        };
        Ok(WriteOutcome {
            entry_id,
            mirror: self.mirror(&entry),
        })
    }

    /// Record a photo. Same contract as [`write_song`](Self::write_song).
    pub fn write_photo(
        &self,
        label: Option<&str>,
        occurred_at: DateTime<Utc>,
        media_ref: &str,
    ) -> Result<WriteOutcome, SyncError> {
        let entry_id = self.store.insert_photo(label, occurred_at, media_ref)?;
        let entry = Entry::Photo {
            label: label.map(String::from),
            taken_at: occurred_at,
            media_ref: Some(media_ref.to_string()),
        };
        Ok(WriteOutcome {
            entry_id,
            mirror: self.mirror(&entry),
        })
    }

    fn mirror(&self, entry: &Entry) -> MirrorStatus {
        if !self.auth.is_authenticated() {
            return MirrorStatus::SkippedNotAuthenticated;
        }

        let draft = event_codec::encode(entry);
        match self.calendar.create_event(&draft) {
            Ok(remote_id) => MirrorStatus::Mirrored { remote_id },
            Err(e) => {
                tracing::warn!("calendar mirror failed, local write stands: {e}");
                MirrorStatus::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }

    /// The merged timeline: all local entries (occurrence descending),
    /// then, when authenticated, entries decoded from the calendar over the
    /// default window, each tagged with its remote id.
    ///
    /// Two deliberate properties, kept from the observed behavior:
    /// no re-sort after concatenation (local order, then remote order), and
    /// no deduplication between the two sources, so an entry written while
    /// authenticated appears twice.
    pub fn read_timeline(&self) -> Result<Vec<TimelineItem>, SyncError> {
        let mut items: Vec<TimelineItem> = self
            .store
            .list_entries()?
            .into_iter()
            .map(|stored| TimelineItem {
                entry: stored.entry,
                source: TimelineSource::Local { id: stored.id },
            })
            .collect();

        if self.auth.is_authenticated() {
            match self.calendar.list_events(None) {
                Ok(events) => {
                    for event in events {
                        if let Some(entry) = event_codec::decode(&event) {
                            items.push(TimelineItem {
                                entry,
                                source: TimelineSource::Remote {
                                    remote_id: event.remote_id,
                                },
                            });
                        }
                    }
                }
                Err(e) => {
                    tracing::warn!("calendar fetch failed, timeline is local-only: {e}");
                }
            }
        }

        Ok(items)
    }

    /// Delete a photo from the local store. The mirrored calendar event, if
    /// any, is untouched; use [`delete_remote`](Self::delete_remote) with
    /// the remote id from the timeline to remove it.
    pub fn delete_photo(&self, id: i64) -> Result<bool, SyncError> {
        Ok(self.store.delete_photo(id)?)
    }

    /// Delete a mirrored event by its remote id. Already-gone ids are
    /// success.
    pub fn delete_remote(&self, remote_id: &str) -> Result<(), SyncError> {
        self.calendar.delete_event(remote_id)
    }

    /// Clear all local history. Mirrored events stay in the calendar.
    pub fn clear_history(&self) -> Result<(), SyncError> {
        Ok(self.store.clear_all()?)
    }

    /// Whether calendar mirroring is active; callers use this to decide
    /// whether to prompt for consent.
    pub fn is_authenticated(&self) -> bool {
        self.auth.is_authenticated()
    }
}

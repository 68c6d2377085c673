//! Tests for the sync coordinator.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{Duration, Utc};

use crate::auth::oauth::{Credential, OAuthConfig, TokenEndpoint};
use crate::auth::{CredentialLifecycle, MemoryCredentialStore};
use crate::entry::Entry;
use crate::error::OAuthError;
use crate::storage::DiaryStore;
use crate::sync::calendar_client::RemoteCalendar;
use crate::sync::coordinator::SyncCoordinator;
use crate::sync::types::{EventDraft, MirrorStatus, RemoteEvent, SyncError, TimeRange};

/// In-memory calendar double. Stores whatever is created and lists it back.
#[derive(Default)]
struct FakeCalendar {
    events: Mutex<Vec<RemoteEvent>>,
    next_id: AtomicUsize,
    fail_creates: bool,
    fail_lists: bool,
}

impl FakeCalendar {
    fn failing() -> Self {
        Self {
            fail_creates: true,
            fail_lists: true,
            ..Default::default()
        }
    }

    fn push_event(&self, event: RemoteEvent) {
        self.events.lock().unwrap().push(event);
    }

    fn event_count(&self) -> usize {
        self.events.lock().unwrap().len()
    }
}

impl RemoteCalendar for FakeCalendar {
    fn create_event(&self, draft: &EventDraft) -> Result<String, SyncError> {
        if self.fail_creates {
            return Err(SyncError::RemoteUnavailable("connection reset".into()));
        }
        let remote_id = format!("remote-{}", self.next_id.fetch_add(1, Ordering::SeqCst));
        self.push_event(RemoteEvent {
            remote_id: remote_id.clone(),
            subject: draft.subject.clone(),
            body: draft.body.clone(),
            start_time: draft.start_time,
            end_time: draft.end_time,
        });
        Ok(remote_id)
    }

    fn list_events(&self, _range: Option<TimeRange>) -> Result<Vec<RemoteEvent>, SyncError> {
        if self.fail_lists {
            return Err(SyncError::RemoteUnavailable("connection reset".into()));
        }
        Ok(self.events.lock().unwrap().clone())
    }

    fn delete_event(&self, remote_id: &str) -> Result<(), SyncError> {
        self.events
            .lock()
            .unwrap()
            .retain(|e| e.remote_id != remote_id);
        Ok(())
    }
}

/// Endpoint that must never be reached (credentials in these tests are
/// either fresh or absent).
struct UnreachableEndpoint;

impl TokenEndpoint for UnreachableEndpoint {
    fn exchange_code(&self, _: &OAuthConfig, _: &str) -> Result<Credential, OAuthError> {
        panic!("token endpoint should not be called");
    }

    fn refresh(&self, _: &OAuthConfig, _: &str) -> Result<Credential, OAuthError> {
        panic!("token endpoint should not be called");
    }
}

fn authenticated_lifecycle() -> Arc<CredentialLifecycle> {
    let credential = Credential {
        access_token: "token".to_string(),
        refresh_token: Some("refresh".to_string()),
        expires_at: Some(Utc::now().timestamp() + 3600),
    };
    Arc::new(CredentialLifecycle::new(
        OAuthConfig::google("id".into(), "secret".into(), 0),
        Arc::new(MemoryCredentialStore::with_credential(credential)),
        Arc::new(UnreachableEndpoint),
    ))
}

fn unauthenticated_lifecycle() -> Arc<CredentialLifecycle> {
    Arc::new(CredentialLifecycle::new(
        OAuthConfig::google("id".into(), "secret".into(), 0),
        Arc::new(MemoryCredentialStore::new()),
        Arc::new(UnreachableEndpoint),
    ))
}

fn coordinator(
    auth: Arc<CredentialLifecycle>,
    calendar: Arc<FakeCalendar>,
) -> (SyncCoordinator, Arc<DiaryStore>) {
    let store = Arc::new(DiaryStore::open_memory().unwrap());
    (
        SyncCoordinator::new(store.clone(), auth, calendar),
        store,
    )
}

#[test]
fn test_unauthenticated_write_skips_mirror() {
    let calendar = Arc::new(FakeCalendar::default());
    let (coordinator, store) = coordinator(unauthenticated_lifecycle(), calendar.clone());

    let outcome = coordinator
        .write_song("Clair de Lune", Some("Debussy"), Utc::now())
        .unwrap();

    assert_eq!(outcome.mirror, MirrorStatus::SkippedNotAuthenticated);
    assert_eq!(store.list_songs().unwrap().len(), 1);
    assert_eq!(calendar.event_count(), 0);
}

#[test]
fn test_authenticated_write_mirrors() {
    let calendar = Arc::new(FakeCalendar::default());
    let (coordinator, _store) = coordinator(authenticated_lifecycle(), calendar.clone());

    let outcome = coordinator
        .write_song("Pale Blue Eyes", Some("The Velvet Underground"), Utc::now())
        .unwrap();

    match outcome.mirror {
        MirrorStatus::Mirrored { ref remote_id } => assert_eq!(remote_id, "remote-0"),
        ref other => panic!("expected mirrored, got {other:?}"),
    }
    let events = calendar.events.lock().unwrap();
    assert_eq!(events.len(), 1);
    assert!(events[0].subject.contains("Pale Blue Eyes"));
    assert!(events[0].body.contains("via E-Motionary"));
}

#[test]
fn test_mirror_failure_keeps_local_write() {
    let calendar = Arc::new(FakeCalendar::failing());
    let (coordinator, store) = coordinator(authenticated_lifecycle(), calendar);

    let outcome = coordinator
        .write_photo(Some("sunset"), Utc::now(), "media/1.jpg")
        .unwrap();

    assert!(matches!(outcome.mirror, MirrorStatus::Failed { .. }));
    assert_eq!(store.list_photos().unwrap().len(), 1);

    // the entry is visible on the next read even though the remote fetch
    // also fails
    let timeline = coordinator.read_timeline().unwrap();
    assert_eq!(timeline.len(), 1);
    assert_eq!(timeline[0].remote_id(), None);
}

#[test]
fn test_local_persistence_failure_is_fatal() {
    let calendar = Arc::new(FakeCalendar::default());
    let (coordinator, _store) = coordinator(authenticated_lifecycle(), calendar.clone());

    let result = coordinator.write_song("", None, Utc::now());
    assert!(matches!(result, Err(SyncError::Persistence(_))));
    // no mirror was attempted for the failed write
    assert_eq!(calendar.event_count(), 0);
}

#[test]
fn test_repeated_writes_are_not_deduplicated() {
    let calendar = Arc::new(FakeCalendar::default());
    let (coordinator, store) = coordinator(unauthenticated_lifecycle(), calendar);

    let t = Utc::now();
    let first = coordinator.write_song("A", Some("B"), t).unwrap();
    let second = coordinator.write_song("A", Some("B"), t).unwrap();

    assert_ne!(first.entry_id, second.entry_id);
    assert_eq!(store.list_songs().unwrap().len(), 2);
}

#[test]
fn test_timeline_merges_local_then_remote() {
    let calendar = Arc::new(FakeCalendar::default());
    let (coordinator, _store) = coordinator(authenticated_lifecycle(), calendar);

    let t0 = Utc::now() - Duration::hours(2);
    let t1 = Utc::now() - Duration::hours(1);
    coordinator.write_song("Older", None, t0).unwrap();
    coordinator.write_song("Newer", None, t1).unwrap();

    let timeline = coordinator.read_timeline().unwrap();
    // 2 local (occurrence descending) followed by 2 remote (listing order)
    assert_eq!(timeline.len(), 4);
    assert_eq!(timeline[0].remote_id(), None);
    assert_eq!(timeline[1].remote_id(), None);
    assert!(timeline[2].remote_id().is_some());
    assert!(timeline[3].remote_id().is_some());

    match (&timeline[0].entry, &timeline[1].entry) {
        (Entry::Song { title: first, .. }, Entry::Song { title: second, .. }) => {
            assert_eq!(first, "Newer");
            assert_eq!(second, "Older");
        }
        other => panic!("expected songs, got {other:?}"),
    }
}

#[test]
fn test_timeline_excludes_foreign_events() {
    let calendar = Arc::new(FakeCalendar::default());
    calendar.push_event(RemoteEvent {
        remote_id: "foreign-1".to_string(),
        subject: "Dentist".to_string(),
        body: "Annual checkup".to_string(),
        start_time: Utc::now(),
        end_time: Utc::now() + Duration::hours(1),
    });
    let (coordinator, _store) = coordinator(authenticated_lifecycle(), calendar);

    let timeline = coordinator.read_timeline().unwrap();
    assert!(timeline.is_empty());
}

#[test]
fn test_delete_photo_local_only() {
    let calendar = Arc::new(FakeCalendar::default());
    let (coordinator, _store) = coordinator(authenticated_lifecycle(), calendar.clone());

    let outcome = coordinator
        .write_photo(None, Utc::now(), "media/1.jpg")
        .unwrap();

    assert!(coordinator.delete_photo(outcome.entry_id).unwrap());
    assert!(!coordinator.delete_photo(outcome.entry_id).unwrap());
    // the mirrored event is untouched by a local delete
    assert_eq!(calendar.event_count(), 1);
}

#[test]
fn test_delete_remote_removes_mirror() {
    let calendar = Arc::new(FakeCalendar::default());
    let (coordinator, _store) = coordinator(authenticated_lifecycle(), calendar.clone());

    let outcome = coordinator
        .write_photo(Some("sunset"), Utc::now(), "media/1.jpg")
        .unwrap();
    let remote_id = match outcome.mirror {
        MirrorStatus::Mirrored { remote_id } => remote_id,
        other => panic!("expected mirrored, got {other:?}"),
    };

    coordinator.delete_remote(&remote_id).unwrap();
    assert_eq!(calendar.event_count(), 0);
    // deleting again is still success
    coordinator.delete_remote(&remote_id).unwrap();
}

#[test]
fn test_clear_history_leaves_remote_alone() {
    let calendar = Arc::new(FakeCalendar::default());
    let (coordinator, store) = coordinator(authenticated_lifecycle(), calendar.clone());

    coordinator.write_song("S", None, Utc::now()).unwrap();
    coordinator.clear_history().unwrap();

    assert!(store.list_entries().unwrap().is_empty());
    assert_eq!(calendar.event_count(), 1);
}

/// The documented non-dedup scenario: a song written while unauthenticated
/// stays local-only; a photo written while authenticated appears twice.
#[test]
fn test_mirrored_write_appears_twice_in_timeline() {
    let calendar = Arc::new(FakeCalendar::default());
    let store = Arc::new(DiaryStore::open_memory().unwrap());

    let t0 = Utc::now() - Duration::hours(2);
    let offline =
        SyncCoordinator::new(store.clone(), unauthenticated_lifecycle(), calendar.clone());
    offline.write_song("Clair de Lune", Some("Debussy"), t0).unwrap();

    let timeline = offline.read_timeline().unwrap();
    assert_eq!(timeline.len(), 1);
    assert_eq!(timeline[0].remote_id(), None);

    // authenticate and capture a photo
    let t1 = Utc::now() - Duration::hours(1);
    let online = SyncCoordinator::new(store, authenticated_lifecycle(), calendar);
    online
        .write_photo(Some("sunset"), t1, "media/1.jpg")
        .unwrap();

    let timeline = online.read_timeline().unwrap();
    assert_eq!(timeline.len(), 3);

    let photos: Vec<_> = timeline
        .iter()
        .filter(|item| matches!(item.entry, Entry::Photo { .. }))
        .collect();
    assert_eq!(photos.len(), 2);
    assert!(photos.iter().any(|item| item.remote_id().is_none()));
    assert!(photos.iter().any(|item| item.remote_id().is_some()));

    let songs: Vec<_> = timeline
        .iter()
        .filter(|item| matches!(item.entry, Entry::Song { .. }))
        .collect();
    assert_eq!(songs.len(), 1);
    assert_eq!(songs[0].remote_id(), None);
}

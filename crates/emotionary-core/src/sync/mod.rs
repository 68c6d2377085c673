//! Google Calendar mirroring layer.
//!
//! Diary entries are mirrored best-effort into generic calendar events;
//! reads merge the local store with entries decoded back from the calendar.

pub mod calendar_client;
pub mod coordinator;
pub mod event_codec;
pub mod types;

#[cfg(test)]
mod coordinator_tests;

pub use calendar_client::{CalendarClient, RemoteCalendar};
pub use coordinator::SyncCoordinator;
pub use types::{
    EventDraft, MirrorStatus, RemoteEvent, SyncError, TimeRange, TimelineItem, TimelineSource,
    WriteOutcome,
};

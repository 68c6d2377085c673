//! SQLite-based diary storage.
//!
//! The single source of truth for diary entries. Songs and photos live in
//! separate tables keyed by a store-assigned rowid; every row records both
//! the occurrence timestamp (listened/taken) and the insertion timestamp.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};

use crate::entry::Entry;
use crate::error::StoreError;

use super::data_dir;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SongRecord {
    pub id: i64,
    pub title: String,
    pub artist: Option<String>,
    pub listened_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhotoRecord {
    pub id: i64,
    pub label: Option<String>,
    pub taken_at: DateTime<Utc>,
    pub media_ref: String,
    pub created_at: DateTime<Utc>,
}

/// An entry as it sits in the store, with its assigned id.
#[derive(Debug, Clone)]
pub struct StoredEntry {
    pub id: i64,
    pub entry: Entry,
    pub created_at: DateTime<Utc>,
}

/// SQLite database for diary entries.
///
/// The connection sits behind a mutex so request-parallel callers can share
/// one store; inserts are append-only with store-assigned ids, so concurrent
/// writers never conflict.
pub struct DiaryStore {
    conn: Mutex<Connection>,
}

impl DiaryStore {
    /// Open the database at `~/.config/emotionary/emotionary.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self, StoreError> {
        let path = data_dir()?.join("emotionary.db");
        Self::open_at(&path)
    }

    /// Open a database at an explicit path.
    pub fn open_at(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path).map_err(|source| StoreError::OpenFailed {
            path: PathBuf::from(path),
            source,
        })?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.migrate()?;
        Ok(store)
    }

    /// Open an in-memory database (for tests).
    #[cfg(test)]
    pub fn open_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.migrate()?;
        Ok(store)
    }

    fn migrate(&self) -> Result<(), StoreError> {
        let conn = self.lock();
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS songs (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                title       TEXT NOT NULL,
                artist      TEXT,
                listened_at TEXT NOT NULL,
                created_at  TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS photos (
                id         INTEGER PRIMARY KEY AUTOINCREMENT,
                label      TEXT,
                taken_at   TEXT NOT NULL,
                media_ref  TEXT NOT NULL,
                created_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_songs_listened_at ON songs(listened_at);
            CREATE INDEX IF NOT EXISTS idx_photos_taken_at ON photos(taken_at);",
        )?;
        Ok(())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Connection> {
        // A poisoned lock means a panic mid-statement; the connection itself
        // is still usable for independent statements.
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Insert a song entry, returning its store-assigned id.
    ///
    /// # Errors
    /// Rejects an empty (or whitespace-only) title; returns an error if the
    /// insert fails.
    pub fn insert_song(
        &self,
        title: &str,
        artist: Option<&str>,
        listened_at: DateTime<Utc>,
    ) -> Result<i64, StoreError> {
        if title.trim().is_empty() {
            return Err(StoreError::InvalidEntry("song title is required".into()));
        }
        let conn = self.lock();
        conn.execute(
            "INSERT INTO songs (title, artist, listened_at, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                title,
                artist,
                listened_at.to_rfc3339(),
                Utc::now().to_rfc3339(),
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Insert a photo entry, returning its store-assigned id.
    ///
    /// # Errors
    /// Returns an error if the insert fails.
    pub fn insert_photo(
        &self,
        label: Option<&str>,
        taken_at: DateTime<Utc>,
        media_ref: &str,
    ) -> Result<i64, StoreError> {
        if media_ref.is_empty() {
            return Err(StoreError::InvalidEntry("photo media_ref is required".into()));
        }
        let conn = self.lock();
        conn.execute(
            "INSERT INTO photos (label, taken_at, media_ref, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                label,
                taken_at.to_rfc3339(),
                media_ref,
                Utc::now().to_rfc3339(),
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// All songs, most recently listened first.
    pub fn list_songs(&self) -> Result<Vec<SongRecord>, StoreError> {
        let conn = self.lock();
        let mut stmt = conn.prepare(
            "SELECT id, title, artist, listened_at, created_at
             FROM songs ORDER BY listened_at DESC",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(SongRecord {
                id: row.get(0)?,
                title: row.get(1)?,
                artist: row.get(2)?,
                listened_at: parse_timestamp(row.get::<_, String>(3)?, 3)?,
                created_at: parse_timestamp(row.get::<_, String>(4)?, 4)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// All photos, most recently taken first.
    pub fn list_photos(&self) -> Result<Vec<PhotoRecord>, StoreError> {
        let conn = self.lock();
        let mut stmt = conn.prepare(
            "SELECT id, label, taken_at, media_ref, created_at
             FROM photos ORDER BY taken_at DESC",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(PhotoRecord {
                id: row.get(0)?,
                label: row.get(1)?,
                taken_at: parse_timestamp(row.get::<_, String>(2)?, 2)?,
                media_ref: row.get(3)?,
                created_at: parse_timestamp(row.get::<_, String>(4)?, 4)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Both kinds merged, occurrence timestamp descending.
    pub fn list_entries(&self) -> Result<Vec<StoredEntry>, StoreError> {
        let mut entries: Vec<StoredEntry> = self
            .list_songs()?
            .into_iter()
            .map(|s| StoredEntry {
                id: s.id,
                created_at: s.created_at,
                entry: Entry::Song {
                    title: s.title,
                    artist: s.artist,
                    listened_at: s.listened_at,
                },
            })
            .collect();

        entries.extend(self.list_photos()?.into_iter().map(|p| StoredEntry {
            id: p.id,
            created_at: p.created_at,
            entry: Entry::Photo {
                label: p.label,
                taken_at: p.taken_at,
                media_ref: Some(p.media_ref),
            },
        }));

        entries.sort_by(|a, b| b.entry.occurred_at().cmp(&a.entry.occurred_at()));
        Ok(entries)
    }

    /// Delete a photo by id. Returns whether a row was removed.
    pub fn delete_photo(&self, id: i64) -> Result<bool, StoreError> {
        let conn = self.lock();
        let affected = conn.execute("DELETE FROM photos WHERE id = ?1", params![id])?;
        Ok(affected > 0)
    }

    /// Delete all songs and photos.
    pub fn clear_all(&self) -> Result<(), StoreError> {
        let conn = self.lock();
        conn.execute_batch("DELETE FROM songs; DELETE FROM photos;")?;
        Ok(())
    }
}

fn parse_timestamp(raw: String, col: usize) -> Result<DateTime<Utc>, rusqlite::Error> {
    DateTime::parse_from_rfc3339(&raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(col, rusqlite::types::Type::Text, Box::new(e))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_insert_and_list_songs_ordered() {
        let store = DiaryStore::open_memory().unwrap();
        let t0 = Utc::now() - Duration::hours(2);
        let t1 = Utc::now() - Duration::hours(1);

        store.insert_song("First", Some("A"), t0).unwrap();
        store.insert_song("Second", Some("B"), t1).unwrap();

        let songs = store.list_songs().unwrap();
        assert_eq!(songs.len(), 2);
        assert_eq!(songs[0].title, "Second");
        assert_eq!(songs[1].title, "First");
    }

    #[test]
    fn test_empty_title_rejected() {
        let store = DiaryStore::open_memory().unwrap();
        let result = store.insert_song("   ", None, Utc::now());
        assert!(matches!(result, Err(StoreError::InvalidEntry(_))));
        assert!(store.list_songs().unwrap().is_empty());
    }

    #[test]
    fn test_duplicate_writes_create_distinct_rows() {
        let store = DiaryStore::open_memory().unwrap();
        let t = Utc::now();
        let id1 = store.insert_song("A", Some("B"), t).unwrap();
        let id2 = store.insert_song("A", Some("B"), t).unwrap();
        assert_ne!(id1, id2);
        assert_eq!(store.list_songs().unwrap().len(), 2);
    }

    #[test]
    fn test_created_at_distinct_from_occurrence() {
        let store = DiaryStore::open_memory().unwrap();
        let listened = Utc::now() - Duration::days(3);
        store.insert_song("Old Song", None, listened).unwrap();

        let songs = store.list_songs().unwrap();
        assert_eq!(songs[0].listened_at, listened);
        assert!(songs[0].created_at > listened);
    }

    #[test]
    fn test_timestamp_round_trip() {
        let store = DiaryStore::open_memory().unwrap();
        let t = Utc::now();
        store.insert_photo(Some("sunset"), t, "media/1.jpg").unwrap();

        let photos = store.list_photos().unwrap();
        assert_eq!(photos[0].taken_at, t);
        assert_eq!(photos[0].media_ref, "media/1.jpg");
    }

    #[test]
    fn test_list_entries_merges_both_kinds() {
        let store = DiaryStore::open_memory().unwrap();
        let t0 = Utc::now() - Duration::hours(3);
        let t1 = Utc::now() - Duration::hours(2);
        let t2 = Utc::now() - Duration::hours(1);

        store.insert_song("Oldest", None, t0).unwrap();
        store.insert_photo(Some("middle"), t1, "m.jpg").unwrap();
        store.insert_song("Newest", None, t2).unwrap();

        let entries = store.list_entries().unwrap();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].entry.occurred_at(), t2);
        assert_eq!(entries[1].entry.occurred_at(), t1);
        assert_eq!(entries[2].entry.occurred_at(), t0);
        for stored in &entries {
            assert!(stored.created_at > stored.entry.occurred_at());
        }
    }

    #[test]
    fn test_delete_photo() {
        let store = DiaryStore::open_memory().unwrap();
        let id = store.insert_photo(None, Utc::now(), "m.jpg").unwrap();

        assert!(store.delete_photo(id).unwrap());
        assert!(!store.delete_photo(id).unwrap());
        assert!(store.list_photos().unwrap().is_empty());
    }

    #[test]
    fn test_clear_all() {
        let store = DiaryStore::open_memory().unwrap();
        store.insert_song("S", None, Utc::now()).unwrap();
        store.insert_photo(None, Utc::now(), "m.jpg").unwrap();

        store.clear_all().unwrap();
        assert!(store.list_entries().unwrap().is_empty());
    }
}

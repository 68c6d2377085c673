//! Song diary commands.

use chrono::{DateTime, Utc};
use clap::Subcommand;
use emotionary_core::storage::DiaryStore;

use super::common;

#[derive(Subcommand)]
pub enum SongAction {
    /// Record a listened song
    Add {
        /// Song title
        title: String,
        /// Artist name
        #[arg(long)]
        artist: Option<String>,
        /// When it was heard (RFC3339); defaults to now
        #[arg(long)]
        at: Option<DateTime<Utc>>,
    },
    /// List recorded songs, most recent first
    List,
}

pub fn run(action: SongAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        SongAction::Add { title, artist, at } => {
            let coordinator = common::build_coordinator()?;
            let outcome =
                coordinator.write_song(&title, artist.as_deref(), at.unwrap_or_else(Utc::now))?;
            common::print_write_outcome("Song", &outcome);
        }
        SongAction::List => {
            let store = DiaryStore::open()?;
            let songs = store.list_songs()?;
            if songs.is_empty() {
                println!("No songs recorded yet.");
            }
            for song in songs {
                let artist = song
                    .artist
                    .map(|a| format!(" - {a}"))
                    .unwrap_or_default();
                println!(
                    "{:>4}  {}  {}{}",
                    song.id,
                    song.listened_at.format("%Y-%m-%d %H:%M"),
                    song.title,
                    artist,
                );
            }
        }
    }
    Ok(())
}

//! Photo diary commands.

use chrono::{DateTime, Utc};
use clap::Subcommand;
use emotionary_core::storage::DiaryStore;

use super::common;

#[derive(Subcommand)]
pub enum PhotoAction {
    /// Record a captured photo
    Add {
        /// Reference to the stored image (path or URL)
        media_ref: String,
        /// Optional label for the photo
        #[arg(long)]
        label: Option<String>,
        /// When it was taken (RFC3339); defaults to now
        #[arg(long)]
        at: Option<DateTime<Utc>>,
    },
    /// List recorded photos, most recent first
    List,
    /// Delete a photo from the diary
    Delete {
        /// Photo id (see 'photo list')
        id: i64,
        /// Also remove the mirrored calendar event with this id
        #[arg(long)]
        remote_id: Option<String>,
    },
}

pub fn run(action: PhotoAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        PhotoAction::Add {
            media_ref,
            label,
            at,
        } => {
            let coordinator = common::build_coordinator()?;
            let outcome = coordinator.write_photo(
                label.as_deref(),
                at.unwrap_or_else(Utc::now),
                &media_ref,
            )?;
            common::print_write_outcome("Photo", &outcome);
        }
        PhotoAction::List => {
            let store = DiaryStore::open()?;
            let photos = store.list_photos()?;
            if photos.is_empty() {
                println!("No photos recorded yet.");
            }
            for photo in photos {
                println!(
                    "{:>4}  {}  {}  {}",
                    photo.id,
                    photo.taken_at.format("%Y-%m-%d %H:%M"),
                    photo.label.as_deref().unwrap_or("(no label)"),
                    photo.media_ref,
                );
            }
        }
        PhotoAction::Delete { id, remote_id } => {
            let coordinator = common::build_coordinator()?;
            if coordinator.delete_photo(id)? {
                println!("Photo {id} deleted");
            } else {
                println!("No photo with id {id}");
            }
            if let Some(remote_id) = remote_id {
                coordinator.delete_remote(&remote_id)?;
                println!("Calendar event {remote_id} removed");
            }
        }
    }
    Ok(())
}

//! Merged timeline command.

use emotionary_core::entry::Entry;

use super::common;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let coordinator = common::build_coordinator()?;

    if !coordinator.is_authenticated() {
        println!("(calendar not connected; showing local entries only)");
    }

    let items = coordinator.read_timeline()?;
    if items.is_empty() {
        println!("No diary entries yet.");
        return Ok(());
    }

    for item in items {
        let source = match item.remote_id() {
            Some(remote_id) => format!("calendar {remote_id}"),
            None => "local".to_string(),
        };
        let kind = format!("[{}]", item.entry.kind().as_str());
        match &item.entry {
            Entry::Song {
                title,
                artist,
                listened_at,
            } => {
                let artist = artist
                    .as_deref()
                    .map(|a| format!(" - {a}"))
                    .unwrap_or_default();
                println!(
                    "{}  {kind:<7}  {}{}  ({source})",
                    listened_at.format("%Y-%m-%d %H:%M"),
                    title,
                    artist,
                );
            }
            Entry::Photo {
                label, taken_at, ..
            } => {
                println!(
                    "{}  {kind:<7}  {}  ({source})",
                    taken_at.format("%Y-%m-%d %H:%M"),
                    label.as_deref().unwrap_or("(no label)"),
                );
            }
        }
    }
    Ok(())
}

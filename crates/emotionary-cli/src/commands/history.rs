//! History management commands.

use clap::Subcommand;

use super::common;

#[derive(Subcommand)]
pub enum HistoryAction {
    /// Delete all songs and photos from the local diary
    Clear,
}

pub fn run(action: HistoryAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        HistoryAction::Clear => {
            let coordinator = common::build_coordinator()?;
            coordinator.clear_history()?;
            println!("History cleared (mirrored calendar events are untouched)");
        }
    }
    Ok(())
}

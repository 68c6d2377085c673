mod config;
pub mod database;

pub use config::{AuthConfig, Config, SyncConfig};
pub use database::{DiaryStore, PhotoRecord, SongRecord, StoredEntry};

use std::path::PathBuf;

/// Returns `~/.config/emotionary[-dev]/` based on EMOTIONARY_ENV.
///
/// Set EMOTIONARY_ENV=dev to use a development data directory.
///
/// # Errors
/// Returns an error if creating the config directory fails.
pub fn data_dir() -> std::io::Result<PathBuf> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("EMOTIONARY_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("emotionary-dev")
    } else {
        base_dir.join("emotionary")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

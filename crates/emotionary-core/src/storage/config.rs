//! TOML-based application configuration.
//!
//! Stores the calendar mirroring settings and the OAuth callback port.
//! Configuration is stored at `~/.config/emotionary/config.toml`; a missing
//! file yields the defaults.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::data_dir;
use crate::error::ConfigError;

/// Calendar mirroring configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Google Calendar to mirror into.
    #[serde(default = "default_calendar_id")]
    pub calendar_id: String,
    /// How far back the timeline fetch looks, in days.
    #[serde(default = "default_window_days")]
    pub lookback_days: i64,
    /// How far ahead the timeline fetch looks, in days.
    #[serde(default = "default_window_days")]
    pub lookahead_days: i64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            calendar_id: default_calendar_id(),
            lookback_days: default_window_days(),
            lookahead_days: default_window_days(),
        }
    }
}

/// OAuth flow configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Port for the localhost consent callback listener.
    #[serde(default = "default_redirect_port")]
    pub redirect_port: u16,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            redirect_port: default_redirect_port(),
        }
    }
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/emotionary/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub sync: SyncConfig,
    #[serde(default)]
    pub auth: AuthConfig,
}

fn default_calendar_id() -> String {
    "primary".to_string()
}

fn default_window_days() -> i64 {
    30
}

fn default_redirect_port() -> u16 {
    18923
}

impl Config {
    /// Path of the config file inside the data directory.
    pub fn path() -> std::io::Result<PathBuf> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load configuration, falling back to defaults if the file is absent.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::path().map_err(|e| ConfigError::LoadFailed {
            path: PathBuf::from("~/.config/emotionary/config.toml"),
            message: e.to_string(),
        })?;

        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(&path).map_err(|e| ConfigError::LoadFailed {
            path: path.clone(),
            message: e.to_string(),
        })?;
        toml::from_str(&raw).map_err(|e| ConfigError::LoadFailed {
            path,
            message: e.to_string(),
        })
    }

    /// Persist configuration to disk.
    ///
    /// # Errors
    /// Returns an error if serialization or the write fails.
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = Self::path().map_err(|e| ConfigError::SaveFailed {
            path: PathBuf::from("~/.config/emotionary/config.toml"),
            message: e.to_string(),
        })?;

        let raw = toml::to_string_pretty(self).map_err(|e| ConfigError::SaveFailed {
            path: path.clone(),
            message: e.to_string(),
        })?;
        std::fs::write(&path, raw).map_err(|e| ConfigError::SaveFailed {
            path,
            message: e.to_string(),
        })
    }
}

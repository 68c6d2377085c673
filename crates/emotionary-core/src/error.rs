//! Core error types for emotionary-core.
//!
//! Sync-layer errors live in [`crate::sync::types`]; everything else is
//! defined here using thiserror.

use std::path::PathBuf;
use thiserror::Error;

/// Diary store errors. Fatal to the operation that hit them.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Failed to open the database file
    #[error("failed to open diary database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("query failed: {0}")]
    QueryFailed(#[from] rusqlite::Error),

    /// Entry rejected before it reached the database
    #[error("invalid entry: {0}")]
    InvalidEntry(String),

    /// Data directory could not be resolved or created
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },
}

/// OAuth and credential lifecycle errors.
#[derive(Error, Debug)]
pub enum OAuthError {
    /// Consent flow cannot start: client credentials are absent
    #[error("OAuth client credentials not configured for {service}")]
    CredentialsNotConfigured { service: String },

    /// Authorization failed
    #[error("authorization failed: {0}")]
    AuthorizationFailed(String),

    /// Token exchange failed
    #[error("token exchange failed: {0}")]
    TokenExchangeFailed(String),

    /// Token refresh failed
    #[error("token refresh failed: {0}")]
    TokenRefreshFailed(String),

    /// Callback request did not carry an authorization code
    #[error("invalid OAuth callback: {0}")]
    InvalidCallback(String),

    /// A call required an authenticated credential and none was available
    #[error("not authenticated with {service}")]
    NotAuthenticated { service: String },

    /// Credential store (keyring or other backend) failure
    #[error("credential store error: {0}")]
    Store(String),

    /// Network error talking to the token endpoint
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// IO error during the callback listener
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<keyring::Error> for OAuthError {
    fn from(err: keyring::Error) -> Self {
        OAuthError::Store(err.to_string())
    }
}

//! Shared construction of the core components.

use std::sync::Arc;

use emotionary_core::auth::{
    self, CredentialLifecycle, HttpTokenEndpoint, KeyringCredentialStore, OAuthConfig,
};
use emotionary_core::storage::{Config, DiaryStore};
use emotionary_core::sync::calendar_client::CalendarClient;
use emotionary_core::sync::types::{MirrorStatus, WriteOutcome};
use emotionary_core::SyncCoordinator;

/// Lifecycle over the OS keyring, with client credentials looked up there
/// as well.
pub fn build_lifecycle(config: &Config) -> Arc<CredentialLifecycle> {
    let (client_id, client_secret) = auth::load_client_credentials();
    let oauth = OAuthConfig::google(client_id, client_secret, config.auth.redirect_port);
    Arc::new(CredentialLifecycle::new(
        oauth,
        Arc::new(KeyringCredentialStore::new()),
        Arc::new(HttpTokenEndpoint),
    ))
}

/// Coordinator over the default store, keyring credentials, and the real
/// Google Calendar client.
pub fn build_coordinator() -> Result<SyncCoordinator, Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let store = Arc::new(DiaryStore::open()?);
    let auth = build_lifecycle(&config);
    let calendar = Arc::new(CalendarClient::new(auth.clone(), &config));
    Ok(SyncCoordinator::new(store, auth, calendar))
}

pub fn print_write_outcome(kind: &str, outcome: &WriteOutcome) {
    match &outcome.mirror {
        MirrorStatus::Mirrored { remote_id } => {
            println!(
                "{kind} recorded (id {}), mirrored to calendar as {remote_id}",
                outcome.entry_id
            );
        }
        MirrorStatus::SkippedNotAuthenticated => {
            println!(
                "{kind} recorded (id {}); not mirrored - run 'emotionary auth login' to enable calendar sync",
                outcome.entry_id
            );
        }
        MirrorStatus::Failed { reason } => {
            println!(
                "{kind} recorded (id {}); calendar mirror failed: {reason}",
                outcome.entry_id
            );
        }
    }
}

//! Credential lifecycle state machine.
//!
//! Unauthenticated -> Authenticating -> Authenticated -> Expired, with
//! transparent refresh and a re-consent path when refresh fails. Expiry is
//! detected lazily on the next call, not via a timer.

use std::sync::{Arc, Mutex, MutexGuard};

use crate::auth::oauth::{self, Credential, OAuthConfig, TokenEndpoint};
use crate::auth::CredentialStore;
use crate::error::OAuthError;

/// Authentication state for the external calendar.
#[derive(Debug, Clone)]
pub enum AuthState {
    Unauthenticated,
    Authenticating,
    Authenticated(Credential),
    Expired(Credential),
}

impl AuthState {
    pub fn name(&self) -> &'static str {
        match self {
            AuthState::Unauthenticated => "unauthenticated",
            AuthState::Authenticating => "authenticating",
            AuthState::Authenticated(_) => "authenticated",
            AuthState::Expired(_) => "expired",
        }
    }
}

/// Manages the credential needed to call the external calendar.
///
/// On construction, a persisted credential places the lifecycle directly in
/// `Authenticated` or `Expired` without a network call. Refresh is
/// serialized: the state lock is held across check-and-refresh, so callers
/// racing an expired credential produce exactly one refresh request.
pub struct CredentialLifecycle {
    config: OAuthConfig,
    store: Arc<dyn CredentialStore>,
    endpoint: Arc<dyn TokenEndpoint>,
    state: Mutex<AuthState>,
}

impl CredentialLifecycle {
    pub fn new(
        config: OAuthConfig,
        store: Arc<dyn CredentialStore>,
        endpoint: Arc<dyn TokenEndpoint>,
    ) -> Self {
        let state = match store.load() {
            Ok(Some(credential)) if credential.is_expired() => AuthState::Expired(credential),
            Ok(Some(credential)) => AuthState::Authenticated(credential),
            Ok(None) => AuthState::Unauthenticated,
            Err(e) => {
                tracing::warn!("failed to load persisted credential: {e}");
                AuthState::Unauthenticated
            }
        };

        Self {
            config,
            store,
            endpoint,
            state: Mutex::new(state),
        }
    }

    /// Run the one-time consent flow (opens the browser).
    ///
    /// # Errors
    /// `CredentialsNotConfigured` if the client id/secret are absent; the
    /// state returns to `Unauthenticated` on any failure.
    pub fn authenticate(&self) -> Result<(), OAuthError> {
        if !self.config.is_configured() {
            return Err(OAuthError::CredentialsNotConfigured {
                service: self.config.service_name.clone(),
            });
        }

        *self.lock_state() = AuthState::Authenticating;

        match oauth::run_consent_flow(&self.config, self.endpoint.as_ref()) {
            Ok(credential) => {
                self.store.save(&credential)?;
                *self.lock_state() = AuthState::Authenticated(credential);
                Ok(())
            }
            Err(e) => {
                *self.lock_state() = AuthState::Unauthenticated;
                Err(e)
            }
        }
    }

    /// A valid access token, refreshing first if the current one lapsed.
    ///
    /// # Errors
    /// `NotAuthenticated` if there is no credential and no refresh path.
    pub fn access_token(&self) -> Result<String, OAuthError> {
        let mut guard = self.lock_state();
        self.ensure_fresh(&mut guard)?;
        match &*guard {
            AuthState::Authenticated(credential) => Ok(credential.access_token.clone()),
            _ => Err(OAuthError::NotAuthenticated {
                service: self.config.service_name.clone(),
            }),
        }
    }

    /// True only in the `Authenticated` state, after an opportunistic
    /// refresh attempt.
    pub fn is_authenticated(&self) -> bool {
        let mut guard = self.lock_state();
        let _ = self.ensure_fresh(&mut guard);
        matches!(&*guard, AuthState::Authenticated(_))
    }

    /// Drop the stored credential, forcing re-consent.
    pub fn disconnect(&self) -> Result<(), OAuthError> {
        self.store.clear()?;
        *self.lock_state() = AuthState::Unauthenticated;
        Ok(())
    }

    /// Current state, for status surfaces.
    pub fn state_name(&self) -> &'static str {
        self.lock_state().name()
    }

    // Runs under the state lock: the lazy Authenticated -> Expired
    // demotion, then at most one refresh call. Refresh failure clears the
    // stored credential and lands in Unauthenticated (re-consent needed).
    fn ensure_fresh(&self, guard: &mut AuthState) -> Result<(), OAuthError> {
        if let AuthState::Authenticated(credential) = &*guard {
            if !credential.is_expired() {
                return Ok(());
            }
            let stale = credential.clone();
            *guard = AuthState::Expired(stale);
        }

        let credential = match &*guard {
            AuthState::Expired(credential) => credential.clone(),
            _ => return Ok(()),
        };

        let Some(refresh_token) = credential.refresh_token else {
            let _ = self.store.clear();
            *guard = AuthState::Unauthenticated;
            return Err(OAuthError::TokenRefreshFailed(
                "no refresh token available".into(),
            ));
        };

        match self.endpoint.refresh(&self.config, &refresh_token) {
            Ok(refreshed) => {
                self.store.save(&refreshed)?;
                tracing::debug!("refreshed access token for {}", self.config.service_name);
                *guard = AuthState::Authenticated(refreshed);
                Ok(())
            }
            Err(e) => {
                tracing::warn!("token refresh failed, re-consent required: {e}");
                let _ = self.store.clear();
                *guard = AuthState::Unauthenticated;
                Err(e)
            }
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, AuthState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

//! Authentication: OAuth2 flow, credential persistence, lifecycle.

pub mod lifecycle;
pub mod oauth;


pub use lifecycle::{AuthState, CredentialLifecycle};
pub use oauth::{Credential, HttpTokenEndpoint, OAuthConfig, TokenEndpoint};

use std::sync::Mutex;

use crate::error::OAuthError;

/// Thin wrapper around the OS keyring for credential storage.
pub mod keyring_store {
    const SERVICE: &str = "emotionary";

    pub fn get(key: &str) -> Result<Option<String>, keyring::Error> {
        let entry = keyring::Entry::new(SERVICE, key)?;
        match entry.get_password() {
            Ok(pw) => Ok(Some(pw)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub fn set(key: &str, value: &str) -> Result<(), keyring::Error> {
        let entry = keyring::Entry::new(SERVICE, key)?;
        entry.set_password(value)?;
        Ok(())
    }

    pub fn delete(key: &str) -> Result<(), keyring::Error> {
        let entry = keyring::Entry::new(SERVICE, key)?;
        match entry.delete_credential() {
            Ok(()) => Ok(()),
            Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e),
        }
    }
}

/// Persist the OAuth client id/secret to the OS keyring.
pub fn save_client_credentials(client_id: &str, client_secret: &str) -> Result<(), OAuthError> {
    keyring_store::set("google_client_id", client_id)?;
    keyring_store::set("google_client_secret", client_secret)?;
    Ok(())
}

/// Load the OAuth client id/secret. Empty strings if not stored yet.
pub fn load_client_credentials() -> (String, String) {
    let client_id = keyring_store::get("google_client_id")
        .ok()
        .flatten()
        .unwrap_or_default();
    let client_secret = keyring_store::get("google_client_secret")
        .ok()
        .flatten()
        .unwrap_or_default();
    (client_id, client_secret)
}

/// Storage for the user's OAuth tokens.
///
/// The storage medium (keyring, file, in-process) is an implementation
/// choice behind this interface; the lifecycle only ever loads, saves,
/// or clears one credential.
pub trait CredentialStore: Send + Sync {
    fn load(&self) -> Result<Option<Credential>, OAuthError>;
    fn save(&self, credential: &Credential) -> Result<(), OAuthError>;
    fn clear(&self) -> Result<(), OAuthError>;
}

/// Credential store backed by the OS keyring (JSON-serialized tokens).
pub struct KeyringCredentialStore {
    key: String,
}

impl KeyringCredentialStore {
    pub fn new() -> Self {
        Self {
            key: "google_tokens".to_string(),
        }
    }
}

impl Default for KeyringCredentialStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CredentialStore for KeyringCredentialStore {
    fn load(&self) -> Result<Option<Credential>, OAuthError> {
        match keyring_store::get(&self.key)? {
            Some(json) => {
                let credential =
                    serde_json::from_str(&json).map_err(|e| OAuthError::Store(e.to_string()))?;
                Ok(Some(credential))
            }
            None => Ok(None),
        }
    }

    fn save(&self, credential: &Credential) -> Result<(), OAuthError> {
        let json =
            serde_json::to_string(credential).map_err(|e| OAuthError::Store(e.to_string()))?;
        keyring_store::set(&self.key, &json)?;
        Ok(())
    }

    fn clear(&self) -> Result<(), OAuthError> {
        keyring_store::delete(&self.key)?;
        Ok(())
    }
}

/// In-process credential store for tests and ephemeral sessions.
#[derive(Default)]
pub struct MemoryCredentialStore {
    credential: Mutex<Option<Credential>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_credential(credential: Credential) -> Self {
        Self {
            credential: Mutex::new(Some(credential)),
        }
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn load(&self) -> Result<Option<Credential>, OAuthError> {
        Ok(self.credential.lock().unwrap_or_else(|e| e.into_inner()).clone())
    }

    fn save(&self, credential: &Credential) -> Result<(), OAuthError> {
        *self.credential.lock().unwrap_or_else(|e| e.into_inner()) = Some(credential.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), OAuthError> {
        *self.credential.lock().unwrap_or_else(|e| e.into_inner()) = None;
        Ok(())
    }
}

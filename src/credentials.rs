//! Token storage in the OS keyring

use std::sync::Mutex;

use crate::error::CredentialError;

/// Keyring service name
pub const KEYRING_SERVICE: &str = "gitpulse";

/// Keyring account holding the GitHub token
pub const KEYRING_ACCOUNT: &str = "github_token";

/// Opaque secret store for the GitHub token.
///
/// A missing token is `Ok(None)`; deleting a missing token succeeds.
pub trait CredentialStore: Send + Sync {
    fn save_token(&self, token: &str) -> Result<(), CredentialError>;
    fn get_token(&self) -> Result<Option<String>, CredentialError>;
    fn delete_token(&self) -> Result<(), CredentialError>;
}

/// Platform keyring (Keychain, Credential Manager, Secret Service/keyutils).
#[derive(Debug, Clone)]
pub struct KeyringStore {
    service: String,
    account: String,
}

impl Default for KeyringStore {
    fn default() -> Self {
        Self::new(KEYRING_SERVICE, KEYRING_ACCOUNT)
    }
}

impl KeyringStore {
    pub fn new(service: impl Into<String>, account: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            account: account.into(),
        }
    }

    fn entry(&self) -> Result<keyring::Entry, CredentialError> {
        Ok(keyring::Entry::new(&self.service, &self.account)?)
    }
}

impl CredentialStore for KeyringStore {
    fn save_token(&self, token: &str) -> Result<(), CredentialError> {
        self.entry()?.set_password(token)?;
        log::debug!("Stored token in keyring service {}", self.service);
        Ok(())
    }

    fn get_token(&self) -> Result<Option<String>, CredentialError> {
        match self.entry()?.get_password() {
            Ok(token) => Ok(Some(token)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn delete_token(&self) -> Result<(), CredentialError> {
        match self.entry()?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Process-local store for tests and keyring-less environments.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    token: Mutex<Option<String>>,
}

impl MemoryCredentialStore {
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Mutex::new(Some(token.into())),
        }
    }

    fn slot(&self) -> Result<std::sync::MutexGuard<'_, Option<String>>, CredentialError> {
        self.token
            .lock()
            .map_err(|_| CredentialError::Keyring("credential lock poisoned".to_string()))
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn save_token(&self, token: &str) -> Result<(), CredentialError> {
        *self.slot()? = Some(token.to_string());
        Ok(())
    }

    fn get_token(&self) -> Result<Option<String>, CredentialError> {
        Ok(self.slot()?.clone())
    }

    fn delete_token(&self) -> Result<(), CredentialError> {
        *self.slot()? = None;
        Ok(())
    }
}

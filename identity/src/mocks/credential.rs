//! Mock credential store for testing.

use crate::error::{IdentityError, Result};
use crate::providers::CredentialStore;
use crate::state::{Account, AccountId};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Default)]
struct Inner {
    secrets: HashMap<AccountId, String>,
    unavailable: bool,
}

/// Mock credential store.
///
/// Keeps secrets in memory without hashing, so tests stay fast. Comparison
/// is constant-time all the same.
#[derive(Debug, Clone, Default)]
pub struct MockCredentialStore {
    inner: Arc<Mutex<Inner>>,
}

impl MockCredentialStore {
    /// Create a new mock credential store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate an outage: every call fails with `IdentityError::Credential`.
    ///
    /// # Errors
    ///
    /// Returns `IdentityError::Credential` if the lock is poisoned.
    pub fn set_unavailable(&self, unavailable: bool) -> Result<()> {
        self.lock()?.unavailable = unavailable;
        Ok(())
    }

    /// Whether a secret is stored for the account.
    #[must_use]
    pub fn has_secret(&self, id: AccountId) -> bool {
        self.inner.lock().is_ok_and(|inner| inner.secrets.contains_key(&id))
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>> {
        self.inner
            .lock()
            .map_err(|_| IdentityError::Credential("lock poisoned".to_string()))
    }

    fn available(&self) -> Result<MutexGuard<'_, Inner>> {
        let inner = self.lock()?;
        if inner.unavailable {
            return Err(IdentityError::Credential("credential store unavailable".to_string()));
        }
        Ok(inner)
    }
}

impl CredentialStore for MockCredentialStore {
    async fn verify(&self, account: &Account, secret: &str) -> Result<bool> {
        let inner = self.available()?;
        Ok(inner.secrets.get(&account.id).is_some_and(|stored| {
            constant_time_eq::constant_time_eq(stored.as_bytes(), secret.as_bytes())
        }))
    }

    async fn set_secret(&self, account: &Account, secret: &str) -> Result<()> {
        self.available()?
            .secrets
            .insert(account.id, secret.to_string());
        Ok(())
    }
}

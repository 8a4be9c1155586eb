//! Mock account store for testing.

use crate::error::{IdentityError, Result};
use crate::providers::{AccountPatch, AccountStore, Precondition};
use crate::state::{Account, AccountId, NewAccount};
use crate::utils::same_identifier;
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

#[derive(Debug, Default)]
struct Inner {
    accounts: BTreeMap<AccountId, Account>,
    last_id: i64,
    unavailable: bool,
}

impl Inner {
    fn check_available(&self) -> Result<()> {
        if self.unavailable {
            return Err(IdentityError::Store("store unavailable".to_string()));
        }
        Ok(())
    }

    /// Reject `email`/`username` if another account already holds them.
    fn check_unique(&self, id: Option<AccountId>, email: &str, username: &str) -> Result<()> {
        let others = self.accounts.values().filter(|a| Some(a.id) != id);
        for other in others {
            if same_identifier(&other.email, email) {
                return Err(IdentityError::EmailTaken);
            }
            if same_identifier(&other.username, username) {
                return Err(IdentityError::UsernameTaken);
            }
        }
        Ok(())
    }
}

/// Mock account store.
///
/// Uses in-memory storage behind a single mutex; every operation, including
/// the conditional update, runs entirely under the lock.
#[derive(Debug, Clone, Default)]
pub struct MockAccountStore {
    inner: Arc<Mutex<Inner>>,
}

impl MockAccountStore {
    /// Create a new, empty mock account store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate a storage outage: every call fails with `IdentityError::Store`.
    ///
    /// # Errors
    ///
    /// Returns `IdentityError::Internal` if the lock is poisoned.
    pub fn set_unavailable(&self, unavailable: bool) -> Result<()> {
        self.lock()?.unavailable = unavailable;
        Ok(())
    }

    /// Remove an account, as an external admin action would.
    ///
    /// # Errors
    ///
    /// Returns `IdentityError::Internal` if the lock is poisoned.
    pub fn remove(&self, id: AccountId) -> Result<Option<Account>> {
        Ok(self.lock()?.accounts.remove(&id))
    }

    /// Number of stored accounts.
    ///
    /// # Errors
    ///
    /// Returns `IdentityError::Internal` if the lock is poisoned.
    pub fn len(&self) -> Result<usize> {
        Ok(self.lock()?.accounts.len())
    }

    /// Whether the store is empty.
    ///
    /// # Errors
    ///
    /// Returns `IdentityError::Internal` if the lock is poisoned.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.lock()?.accounts.is_empty())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Inner>> {
        self.inner
            .lock()
            .map_err(|_| IdentityError::Internal("account store lock poisoned".to_string()))
    }
}

impl AccountStore for MockAccountStore {
    async fn get_by_id(&self, id: AccountId) -> Result<Account> {
        let inner = self.lock()?;
        inner.check_available()?;
        inner
            .accounts
            .get(&id)
            .cloned()
            .ok_or(IdentityError::AccountNotFound)
    }

    async fn get_by_email(&self, email: &str) -> Result<Account> {
        let inner = self.lock()?;
        inner.check_available()?;
        inner
            .accounts
            .values()
            .find(|a| same_identifier(&a.email, email))
            .cloned()
            .ok_or(IdentityError::AccountNotFound)
    }

    async fn find_by_login(&self, identifier: &str) -> Result<Vec<Account>> {
        let inner = self.lock()?;
        inner.check_available()?;
        // BTreeMap iteration is already ordered by id.
        Ok(inner
            .accounts
            .values()
            .filter(|a| same_identifier(&a.username, identifier) || same_identifier(&a.email, identifier))
            .cloned()
            .collect())
    }

    async fn insert(&self, account: &NewAccount) -> Result<Account> {
        let mut inner = self.lock()?;
        inner.check_available()?;
        inner.check_unique(None, &account.email, &account.username)?;

        inner.last_id += 1;
        let now = Utc::now();
        let stored = Account {
            id: AccountId(inner.last_id),
            email: account.email.clone(),
            pending_email: None,
            username: account.username.clone(),
            first_name: account.first_name.clone(),
            last_name: account.last_name.clone(),
            active: account.active,
            activation_token: None,
            credential_epoch: 0,
            created_at: now,
            updated_at: now,
        };
        inner.accounts.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn update_if(
        &self,
        id: AccountId,
        expected: &Precondition,
        patch: &AccountPatch,
    ) -> Result<Option<Account>> {
        let mut inner = self.lock()?;
        inner.check_available()?;

        let Some(current) = inner.accounts.get(&id) else {
            return Ok(None);
        };
        if !expected.matches(current) {
            return Ok(None);
        }

        let mut updated = current.clone();
        patch.apply(&mut updated, Utc::now());
        inner.check_unique(Some(id), &updated.email, &updated.username)?;

        inner.accounts.insert(id, updated.clone());
        Ok(Some(updated))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn new_account(email: &str, username: &str) -> NewAccount {
        NewAccount {
            email: email.to_string(),
            username: username.to_string(),
            first_name: String::new(),
            last_name: String::new(),
            active: true,
        }
    }

    #[tokio::test]
    async fn test_insert_assigns_increasing_ids() {
        let store = MockAccountStore::new();
        let a = store.insert(&new_account("a@b99.com", "a")).await.unwrap();
        let b = store.insert(&new_account("b@b99.com", "b")).await.unwrap();
        assert!(a.id < b.id);
        assert_eq!(store.len().unwrap(), 2);
    }

    #[tokio::test]
    async fn test_case_insensitive_uniqueness() {
        let store = MockAccountStore::new();
        store.insert(&new_account("rosa@b99.com", "Rosa")).await.unwrap();

        assert_eq!(
            store.insert(&new_account("ROSA@b99.com", "other")).await,
            Err(IdentityError::EmailTaken)
        );
        assert_eq!(
            store.insert(&new_account("other@b99.com", "rOSA")).await,
            Err(IdentityError::UsernameTaken)
        );
    }

    #[tokio::test]
    async fn test_update_if_precondition() {
        let store = MockAccountStore::new();
        let account = store.insert(&new_account("a@b99.com", "a")).await.unwrap();
        let patch = AccountPatch {
            first_name: Some("Amy".to_string()),
            ..AccountPatch::default()
        };

        let miss = store
            .update_if(account.id, &Precondition::none().email("x@b99.com"), &patch)
            .await
            .unwrap();
        assert!(miss.is_none());

        let hit = store
            .update_if(account.id, &Precondition::none().email("a@b99.com"), &patch)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(hit.first_name, "Amy");
    }

    #[tokio::test]
    async fn test_update_if_missing_account() {
        let store = MockAccountStore::new();
        let result = store
            .update_if(AccountId(42), &Precondition::none(), &AccountPatch::default())
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_update_if_enforces_unique_email() {
        let store = MockAccountStore::new();
        store.insert(&new_account("a@b99.com", "a")).await.unwrap();
        let b = store.insert(&new_account("b@b99.com", "b")).await.unwrap();

        let patch = AccountPatch {
            email: Some("A@B99.com".to_string()),
            ..AccountPatch::default()
        };
        assert_eq!(
            store.update_if(b.id, &Precondition::none(), &patch).await,
            Err(IdentityError::EmailTaken)
        );
        assert_eq!(store.get_by_id(b.id).await.unwrap().email, "b@b99.com");
    }

    #[tokio::test]
    async fn test_find_by_login_matches_either_field() {
        let store = MockAccountStore::new();
        let jake = store.insert(&new_account("jake@b99.com", "baracuda")).await.unwrap();

        assert_eq!(store.find_by_login("BARACUDA").await.unwrap(), vec![jake.clone()]);
        assert_eq!(store.find_by_login("Jake@B99.com").await.unwrap(), vec![jake]);
        assert!(store.find_by_login("amy").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unavailable_store() {
        let store = MockAccountStore::new();
        store.set_unavailable(true).unwrap();
        assert!(matches!(
            store.get_by_id(AccountId(1)).await,
            Err(IdentityError::Store(_))
        ));
    }
}

//! Account store trait.

use super::{AccountPatch, Precondition};
use crate::error::Result;
use crate::state::{Account, AccountId, NewAccount};

/// Account store.
///
/// This trait abstracts over account persistence (PostgreSQL, in-memory).
///
/// # Implementation Notes
///
/// - `email` and `username` are each unique **case-insensitively**; stores
///   must reject writes that would break this with `EmailTaken` /
///   `UsernameTaken`.
/// - **CRITICAL**: [`update_if`](Self::update_if) MUST be atomic. The
///   precondition check and the write happen as one step, so two
///   concurrent consumers of the same token cannot both succeed:
///   - PostgreSQL: `UPDATE ... WHERE id = $1 AND <precondition> RETURNING *`
///   - In-memory: mutex-protected check-and-write
pub trait AccountStore: Send + Sync {
    /// Get account by primary key.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - Storage query fails
    /// - Account not found → `IdentityError::AccountNotFound`
    fn get_by_id(&self, id: AccountId) -> impl std::future::Future<Output = Result<Account>> + Send;

    /// Get account by email (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - Storage query fails
    /// - Account not found → `IdentityError::AccountNotFound`
    fn get_by_email(&self, email: &str) -> impl std::future::Future<Output = Result<Account>> + Send;

    /// Find accounts whose username OR email equals `identifier`
    /// case-insensitively, ordered by ascending id.
    ///
    /// # Errors
    ///
    /// Returns error if storage query fails.
    fn find_by_login(
        &self,
        identifier: &str,
    ) -> impl std::future::Future<Output = Result<Vec<Account>>> + Send;

    /// Insert a new account, assigning its id and timestamps.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - Storage query fails
    /// - Email collides → `IdentityError::EmailTaken`
    /// - Username collides → `IdentityError::UsernameTaken`
    fn insert(&self, account: &NewAccount) -> impl std::future::Future<Output = Result<Account>> + Send;

    /// Atomically apply `patch` if the account exists and satisfies `expected`.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(account))`: precondition held, patch applied
    /// - `Ok(None)`: account missing or precondition failed; nothing written
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - Storage operation fails
    /// - New email collides → `IdentityError::EmailTaken`
    /// - New username collides → `IdentityError::UsernameTaken`
    fn update_if(
        &self,
        id: AccountId,
        expected: &Precondition,
        patch: &AccountPatch,
    ) -> impl std::future::Future<Output = Result<Option<Account>>> + Send;
}

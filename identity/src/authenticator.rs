//! Login resolution.
//!
//! Resolves an identifier that may be either a username or an email address,
//! compared without regard to case, and checks the secret against the first
//! matching account.
//!
//! Every rejection reads the same to the caller (`AuthFailure`): unknown
//! identifier, wrong secret, and (unless configured otherwise) inactive
//! account are indistinguishable. Storage faults still surface as themselves.

use crate::config::IdentityConfig;
use crate::error::{IdentityError, Result};
use crate::providers::{AccountStore, CredentialStore};
use crate::state::Account;

/// Resolves login attempts.
#[derive(Debug, Clone)]
pub struct Authenticator<A, C>
where
    A: AccountStore,
    C: CredentialStore,
{
    accounts: A,
    credentials: C,
    allow_inactive: bool,
}

impl<A, C> Authenticator<A, C>
where
    A: AccountStore,
    C: CredentialStore,
{
    /// Create an authenticator that refuses inactive accounts.
    #[must_use]
    pub const fn new(accounts: A, credentials: C) -> Self {
        Self {
            accounts,
            credentials,
            allow_inactive: false,
        }
    }

    /// Create an authenticator honoring `config.allow_inactive_login`.
    #[must_use]
    pub const fn from_config(config: &IdentityConfig, accounts: A, credentials: C) -> Self {
        Self {
            accounts,
            credentials,
            allow_inactive: config.allow_inactive_login,
        }
    }

    /// Resolve `identifier` and `secret` to an account.
    ///
    /// When several accounts match (one by username, another by email) the
    /// lowest id wins.
    ///
    /// # Errors
    ///
    /// - `AuthFailure` if no account matches, the secret is wrong, or the
    ///   account is inactive and inactive login is off
    /// - store and credential faults
    pub async fn resolve(&self, identifier: &str, secret: &str) -> Result<Account> {
        let Some(account) = self
            .accounts
            .find_by_login(identifier)
            .await?
            .into_iter()
            .min_by_key(|a| a.id)
        else {
            tracing::debug!("Login refused: unknown identifier");
            return Err(IdentityError::AuthFailure);
        };

        if !self.credentials.verify(&account, secret).await? {
            tracing::info!(account_id = %account.id, "Login refused: bad secret");
            return Err(IdentityError::AuthFailure);
        }

        if !account.active && !self.allow_inactive {
            tracing::info!(account_id = %account.id, "Login refused: inactive account");
            return Err(IdentityError::AuthFailure);
        }

        tracing::info!(account_id = %account.id, "Login succeeded");
        Ok(account)
    }
}

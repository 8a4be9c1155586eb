//! Activation sub-protocol.
//!
//! `Pending` (inactive, no token) → `ActivationRequested` (token stored) →
//! `Active` (token cleared). Re-requesting from `ActivationRequested`
//! replaces the stored token, which supersedes any link sent earlier.

use super::IdentityService;
use crate::error::{IdentityError, Result};
use crate::providers::{AccountPatch, AccountStore, CredentialStore, Notifier, Precondition};
use crate::state::Account;
use crate::token::{TokenClaims, TokenPurpose};

impl<A, C, N> IdentityService<A, C, N>
where
    A: AccountStore + Clone,
    C: CredentialStore + Clone,
    N: Notifier + Clone,
{
    /// Issue (or re-issue) an activation token and send the link.
    ///
    /// # Errors
    ///
    /// - `AlreadyActive` if the account is active
    /// - `AccountNotFound` if the account no longer exists
    /// - `Conflict` if the account changed while the token was stored
    /// - collaborator faults
    pub async fn request_activation(&self, account: &Account) -> Result<Account> {
        let current = self.env.accounts.get_by_id(account.id).await?;
        if current.active {
            return Err(IdentityError::AlreadyActive);
        }

        let token = self.mint(TokenClaims::activation(&current, self.now()))?;

        let expected = Precondition::none().email(&current.email).active(false);
        let patch = AccountPatch {
            activation_token: Some(Some(token.clone())),
            ..AccountPatch::default()
        };
        let updated = self
            .env
            .accounts
            .update_if(current.id, &expected, &patch)
            .await?
            .ok_or(IdentityError::Conflict)?;

        self.notify(&self.mailer.activation(&updated.email, &token))
            .await?;

        tracing::info!(account_id = %updated.id, "Activation requested");
        Ok(updated)
    }

    /// Activate the account the token was issued for.
    ///
    /// The write only applies if the account still has the token's id, the
    /// token's email, and this exact token stored; it clears the token in
    /// the same step, so a token activates at most once.
    ///
    /// # Errors
    ///
    /// - `InvalidToken` if the token does not decode or is not an activation token
    /// - `TokenExpired` if the token carries a passed `exp`
    /// - `AccountNotFound` if no account matches (deleted, superseded, or used)
    /// - collaborator faults
    pub async fn consume_activation(&self, token: &str) -> Result<Account> {
        let claims = self.decode_for(token, TokenPurpose::Activate)?;

        let expected = Precondition::none()
            .email(claims.subject_email.clone())
            .activation_token(token);
        let patch = AccountPatch {
            active: Some(true),
            activation_token: Some(None),
            ..AccountPatch::default()
        };

        match self
            .env
            .accounts
            .update_if(claims.subject_id, &expected, &patch)
            .await?
        {
            Some(account) => {
                tracing::info!(account_id = %account.id, "Account activated");
                Ok(account)
            }
            None => {
                tracing::warn!(
                    account_id = %claims.subject_id,
                    "Activation token matches no account"
                );
                Err(IdentityError::AccountNotFound)
            }
        }
    }
}

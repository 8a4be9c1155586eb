//! Email change sub-protocol.
//!
//! The candidate address is parked in `pending_email` and a confirmation
//! link goes to the account's current address. Consuming the link promotes
//! the candidate to `email`, provided the account still holds the email and pending address
//! the token was minted against and nobody else claimed the address since.

use super::IdentityService;
use crate::error::{IdentityError, Result};
use crate::providers::{AccountPatch, AccountStore, CredentialStore, Notifier, Precondition};
use crate::state::{Account, AccountId};
use crate::token::{TokenClaims, TokenPurpose};
use crate::utils::validate_email;

impl<A, C, N> IdentityService<A, C, N>
where
    A: AccountStore + Clone,
    C: CredentialStore + Clone,
    N: Notifier + Clone,
{
    /// Record `candidate` as pending and send a confirmation link to the
    /// account's current address.
    ///
    /// A second request replaces the pending address, so links minted for
    /// the earlier candidate stop working.
    ///
    /// # Errors
    ///
    /// - `InvalidEmail` if `candidate` is malformed
    /// - `EmailTaken` if another account holds `candidate` (nothing is sent)
    /// - `AccountNotFound` if the account no longer exists
    /// - `Conflict` if the account's email changed concurrently
    /// - collaborator faults
    pub async fn request_email_change(&self, account: &Account, candidate: &str) -> Result<Account> {
        validate_email(candidate)?;
        self.ensure_email_free(account.id, candidate).await?;

        let current = self.env.accounts.get_by_id(account.id).await?;
        let token = self.mint(TokenClaims::email_change(&current, candidate, self.now()))?;

        let patch = AccountPatch {
            pending_email: Some(Some(candidate.to_string())),
            ..AccountPatch::default()
        };
        let updated = self
            .env
            .accounts
            .update_if(current.id, &Precondition::none().email(&current.email), &patch)
            .await?
            .ok_or(IdentityError::Conflict)?;

        self.notify(&self.mailer.email_change(&updated.email, &token)).await?;

        tracing::info!(account_id = %updated.id, "Email change requested");
        Ok(updated)
    }

    /// Promote the pending address carried by `token` to the account email.
    ///
    /// # Errors
    ///
    /// - `InvalidToken` if the token does not decode or is not an email-change token
    /// - `TokenExpired` if the token carries a passed `exp`
    /// - `AccountNotFound` if the account no longer exists
    /// - `StaleToken` if the email or pending address moved on since minting
    /// - `EmailTaken` if the candidate was claimed meanwhile (pending is cleared)
    /// - collaborator faults
    pub async fn consume_email_change(&self, token: &str) -> Result<Account> {
        let claims = self.decode_for(token, TokenPurpose::ChangeEmail)?;
        let candidate = claims.extra.clone().ok_or(IdentityError::InvalidToken)?;

        let account = self.env.accounts.get_by_id(claims.subject_id).await?;
        if account.email != claims.subject_email {
            tracing::warn!(account_id = %account.id, "Email change token minted for a previous email");
            return Err(IdentityError::StaleToken);
        }
        if account.pending_email.as_deref() != Some(candidate.as_str()) {
            tracing::warn!(account_id = %account.id, "Email change token superseded");
            return Err(IdentityError::StaleToken);
        }

        let expected = Precondition::none()
            .email(claims.subject_email.clone())
            .pending_email(candidate.clone());

        match self.ensure_email_free(account.id, &candidate).await {
            Ok(()) => {}
            Err(IdentityError::EmailTaken) => {
                return self.abandon_email_change(account.id, &expected).await;
            }
            Err(e) => return Err(e),
        }

        let patch = AccountPatch {
            email: Some(candidate),
            pending_email: Some(None),
            ..AccountPatch::default()
        };
        match self.env.accounts.update_if(account.id, &expected, &patch).await {
            Ok(Some(updated)) => {
                tracing::info!(account_id = %updated.id, "Email changed");
                Ok(updated)
            }
            Ok(None) => {
                tracing::warn!(account_id = %account.id, "Email change lost a concurrent update");
                Err(IdentityError::StaleToken)
            }
            Err(IdentityError::EmailTaken) => self.abandon_email_change(account.id, &expected).await,
            Err(e) => Err(e),
        }
    }

    /// `Ok` unless an account other than `id` holds `email`.
    async fn ensure_email_free(&self, id: AccountId, email: &str) -> Result<()> {
        match self.env.accounts.get_by_email(email).await {
            Ok(owner) if owner.id != id => {
                tracing::info!(account_id = %id, owner_id = %owner.id, "Email address already taken");
                Err(IdentityError::EmailTaken)
            }
            Ok(_) | Err(IdentityError::AccountNotFound) => Ok(()),
            Err(e) => Err(e),
        }
    }

    /// Clear the pending address after the candidate was claimed elsewhere.
    async fn abandon_email_change(&self, id: AccountId, expected: &Precondition) -> Result<Account> {
        let patch = AccountPatch {
            pending_email: Some(None),
            ..AccountPatch::default()
        };
        // A miss means someone else already moved the record on.
        self.env.accounts.update_if(id, expected, &patch).await?;
        Err(IdentityError::EmailTaken)
    }
}

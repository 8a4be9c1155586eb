//! Password reset and secret change.
//!
//! Reset tokens carry the account's `credential_epoch`. Every secret change
//! bumps the epoch, which retires all reset links minted before it.

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
    /// Send a reset link to the account registered under `email`.
    ///
    /// Succeeds silently when no account uses the address, so callers
    /// cannot probe which addresses are registered.
    ///
    /// # Errors
    ///
    /// Returns collaborator faults only.
    pub async fn request_password_reset(&self, email: &str) -> Result<()> {
        let account = match self.env.accounts.get_by_email(email).await {
            Ok(account) => account,
            Err(IdentityError::AccountNotFound) => {
                tracing::debug!("Password reset requested for an unknown address");
                return Ok(());
            }
            Err(e) => return Err(e),
        };

        let token = self.mint(TokenClaims::password_reset(&account, self.now()))?;
        self.notify(&self.mailer.password_reset(&account.email, &token))
            .await?;

        tracing::info!(account_id = %account.id, "Password reset requested");
        Ok(())
    }

    /// Set a new secret using a reset token. Each token works once.
    ///
    /// The epoch bump spends the token before the secret is written. A
    /// credential store failure after that leaves the old secret in place and
    /// the link used up, so the caller has to request a fresh one.
    ///
    /// # Errors
    ///
    /// - `InvalidToken` if the token does not decode or is not a reset token
    /// - `TokenExpired` if the token carries a passed `exp`
    /// - `AccountNotFound` if no account matches (deleted, email changed, or secret changed since)
    /// - collaborator faults
    pub async fn consume_password_reset(&self, token: &str, new_secret: &str) -> Result<Account> {
        let claims = self.decode_for(token, TokenPurpose::ResetPassword)?;
        let epoch: u64 = claims
            .extra
            .as_deref()
            .and_then(|e| e.parse().ok())
            .ok_or(IdentityError::InvalidToken)?;

        let expected = Precondition::none()
            .email(claims.subject_email.clone())
            .credential_epoch(epoch);
        let patch = AccountPatch {
            bump_credential_epoch: true,
            ..AccountPatch::default()
        };

        let Some(account) = self
            .env
            .accounts
            .update_if(claims.subject_id, &expected, &patch)
            .await?
        else {
            tracing::warn!(account_id = %claims.subject_id, "Reset token matches no account");
            return Err(IdentityError::AccountNotFound);
        };

        self.env.credentials.set_secret(&account, new_secret).await?;

        tracing::info!(account_id = %account.id, "Password reset");
        Ok(account)
    }

    /// Replace the secret after checking the current one.
    ///
    /// # Errors
    ///
    /// - `AuthFailure` if `current_secret` is wrong
    /// - `AccountNotFound` if the account no longer exists
    /// - `Conflict` if the secret changed concurrently
    /// - collaborator faults
    pub async fn change_secret(
        &self,
        account: &Account,
        current_secret: &str,
        new_secret: &str,
    ) -> Result<Account> {
        let current = self.env.accounts.get_by_id(account.id).await?;
        if !self.env.credentials.verify(&current, current_secret).await? {
            tracing::info!(account_id = %current.id, "Secret change refused");
            return Err(IdentityError::AuthFailure);
        }

        let patch = AccountPatch {
            bump_credential_epoch: true,
            ..AccountPatch::default()
        };
        let updated = self
            .env
            .accounts
            .update_if(
                current.id,
                &Precondition::none().credential_epoch(current.credential_epoch),
                &patch,
            )
            .await?
            .ok_or(IdentityError::Conflict)?;

        self.env.credentials.set_secret(&updated, new_secret).await?;

        tracing::info!(account_id = %updated.id, "Secret changed");
        Ok(updated)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use crate::config::IdentityConfig;
    use crate::environment::IdentityEnvironment;
    use crate::error::IdentityError;
    use crate::mocks::{MockAccountStore, MockCredentialStore, MockNotifier};
    use crate::providers::{AccountStore, CredentialStore};
    use crate::service::IdentityService;
    use crate::state::{Account, NewAccount};

    type Service = IdentityService<MockAccountStore, MockCredentialStore, MockNotifier>;

    struct Fixture {
        service: Service,
        credentials: MockCredentialStore,
        notifier: MockNotifier,
        amy: Account,
    }

    async fn fixture() -> Fixture {
        let accounts = MockAccountStore::new();
        let credentials = MockCredentialStore::new();
        let notifier = MockNotifier::new();
        let env = IdentityEnvironment::new(accounts.clone(), credentials.clone(), notifier.clone());
        let config = IdentityConfig::new(b"password-reset-test-key-01234567".to_vec(), "https://b99.com");

        let amy = accounts
            .insert(&NewAccount {
                email: "amy@b99.com".to_string(),
                username: "Aby".to_string(),
                first_name: "Amy".to_string(),
                last_name: "Santiago".to_string(),
                active: true,
            })
            .await
            .unwrap();
        credentials.set_secret(&amy, "philatelie").await.unwrap();

        Fixture {
            service: IdentityService::new(config, env),
            credentials,
            notifier,
            amy,
        }
    }

    fn last_token(notifier: &MockNotifier) -> String {
        notifier.last().unwrap().link.rsplit('/').next().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_unknown_address_is_silent() {
        let f = fixture().await;
        f.service.request_password_reset("nobody@b99.com").await.unwrap();
        assert_eq!(f.notifier.count(), 0);
    }

    #[tokio::test]
    async fn test_reset_sets_secret_once() {
        let f = fixture().await;
        f.service.request_password_reset("amy@b99.com").await.unwrap();
        let token = last_token(&f.notifier);

        let account = f.service.consume_password_reset(&token, "binders").await.unwrap();
        assert_eq!(account.credential_epoch, 1);
        assert!(f.credentials.verify(&account, "binders").await.unwrap());

        assert_eq!(
            f.service.consume_password_reset(&token, "again").await,
            Err(IdentityError::AccountNotFound)
        );
    }

    #[tokio::test]
    async fn test_change_secret_requires_current() {
        let f = fixture().await;
        assert_eq!(
            f.service.change_secret(&f.amy, "wrong", "binders").await,
            Err(IdentityError::AuthFailure)
        );

        let updated = f.service.change_secret(&f.amy, "philatelie", "binders").await.unwrap();
        assert!(f.credentials.verify(&updated, "binders").await.unwrap());
        assert!(!f.credentials.verify(&updated, "philatelie").await.unwrap());
    }

    #[tokio::test]
    async fn test_change_secret_retires_reset_links() {
        let f = fixture().await;
        f.service.request_password_reset("amy@b99.com").await.unwrap();
        let token = last_token(&f.notifier);

        f.service.change_secret(&f.amy, "philatelie", "binders").await.unwrap();

        assert_eq!(
            f.service.consume_password_reset(&token, "hijack").await,
            Err(IdentityError::AccountNotFound)
        );
    }
}

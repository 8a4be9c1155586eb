//! Identity service.
//!
//! Drives the token-gated account transitions. Every transition follows the
//! same shape:
//!
//! ```text
//! request:  re-read account ─▶ mint token ─▶ conditional write ─▶ notify
//! consume:  decode token ─▶ conditional write keyed on claims ─▶ result
//! ```
//!
//! Claims only address the record. Whether a token is still good is decided
//! by the store's precondition check at write time, so a superseded or
//! already-consumed token simply fails to match.
//!
//! # Sub-protocols
//!
//! - [Activation](IdentityService::request_activation)
//! - [Email change](IdentityService::request_email_change)
//! - [Password reset](IdentityService::request_password_reset)

use crate::authenticator::Authenticator;
use crate::config::IdentityConfig;
use crate::environment::IdentityEnvironment;
use crate::error::{IdentityError, Result};
use crate::mailer::Mailer;
use crate::providers::{
    AccountPatch, AccountStore, CredentialStore, Notification, Notifier, Precondition,
};
use crate::state::{Account, AccountId, NewAccount, ProfileUpdate, Registration};
use crate::token::{TokenClaims, TokenCodec, TokenPurpose};
use crate::utils::{same_identifier, validate_email};
use chrono::{DateTime, Utc};

mod activation;
mod email_change;
mod password_reset;

/// Identity service.
///
/// # Type Parameters
///
/// - `A`: Account store
/// - `C`: Credential store
/// - `N`: Notifier
#[derive(Clone)]
pub struct IdentityService<A, C, N>
where
    A: AccountStore + Clone,
    C: CredentialStore + Clone,
    N: Notifier + Clone,
{
    config: IdentityConfig,
    codec: TokenCodec,
    mailer: Mailer,
    env: IdentityEnvironment<A, C, N>,
}

impl<A, C, N> IdentityService<A, C, N>
where
    A: AccountStore + Clone,
    C: CredentialStore + Clone,
    N: Notifier + Clone,
{
    /// Create a new identity service.
    #[must_use]
    pub fn new(config: IdentityConfig, env: IdentityEnvironment<A, C, N>) -> Self {
        Self {
            codec: TokenCodec::from_config(&config),
            mailer: Mailer::from_config(&config),
            config,
            env,
        }
    }

    /// Configuration in use.
    #[must_use]
    pub const fn config(&self) -> &IdentityConfig {
        &self.config
    }

    /// Token codec in use.
    #[must_use]
    pub const fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    /// Collaborators in use.
    #[must_use]
    pub const fn environment(&self) -> &IdentityEnvironment<A, C, N> {
        &self.env
    }

    /// Login resolver sharing this service's stores and configuration.
    #[must_use]
    pub fn authenticator(&self) -> Authenticator<A, C> {
        Authenticator::from_config(
            &self.config,
            self.env.accounts.clone(),
            self.env.credentials.clone(),
        )
    }

    /// Look up an account by id.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` or a store fault.
    pub async fn account(&self, id: AccountId) -> Result<Account> {
        self.env.accounts.get_by_id(id).await
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Registration and profile
    // ═══════════════════════════════════════════════════════════════════════

    /// Create an inactive account, store its secret and send an activation link.
    ///
    /// The account row is written before the secret. If the credential store
    /// then fails, the account stays inactive with no secret and no link is
    /// sent; activation and a password reset recover it.
    ///
    /// # Errors
    ///
    /// - `InvalidEmail` if the address is malformed
    /// - `EmailTaken` / `UsernameTaken` on collision
    /// - collaborator faults
    pub async fn register(&self, registration: &Registration) -> Result<Account> {
        validate_email(&registration.email)?;

        let account = self
            .env
            .accounts
            .insert(&NewAccount {
                email: registration.email.clone(),
                username: registration.username.clone(),
                first_name: registration.first_name.clone(),
                last_name: registration.last_name.clone(),
                active: false,
            })
            .await?;

        self.env
            .credentials
            .set_secret(&account, &registration.secret)
            .await?;

        tracing::info!(account_id = %account.id, "Account registered");

        self.request_activation(&account).await
    }

    /// Edit username and names.
    ///
    /// # Errors
    ///
    /// - `UsernameTaken` if another account holds the username (any case)
    /// - `AccountNotFound` if the account no longer exists
    /// - collaborator faults
    pub async fn update_profile(&self, account: &Account, update: &ProfileUpdate) -> Result<Account> {
        if let Some(username) = &update.username {
            let taken = self
                .env
                .accounts
                .find_by_login(username)
                .await?
                .iter()
                .any(|other| other.id != account.id && same_identifier(&other.username, username));
            if taken {
                return Err(IdentityError::UsernameTaken);
            }
        }

        let patch = AccountPatch {
            username: update.username.clone(),
            first_name: update.first_name.clone(),
            last_name: update.last_name.clone(),
            ..AccountPatch::default()
        };

        let updated = self
            .env
            .accounts
            .update_if(account.id, &Precondition::none(), &patch)
            .await?
            .ok_or(IdentityError::AccountNotFound)?;

        tracing::info!(account_id = %updated.id, "Profile updated");
        Ok(updated)
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Shared helpers
    // ═══════════════════════════════════════════════════════════════════════

    fn now(&self) -> DateTime<Utc> {
        self.env.clock.now()
    }

    /// Encode claims, adding `exp` when a TTL is configured.
    fn mint(&self, claims: TokenClaims) -> Result<String> {
        let claims = match self.config.token_ttl {
            Some(ttl) => claims.expiring_after(ttl),
            None => claims,
        };
        self.codec.encode(&claims)
    }

    /// Decode a token and check it was minted for `purpose` and has not expired.
    fn decode_for(&self, token: &str, purpose: TokenPurpose) -> Result<TokenClaims> {
        let claims = self.codec.decode(token).map_err(|e| {
            tracing::warn!(%purpose, reason = %e, "Rejected token");
            IdentityError::InvalidToken
        })?;

        if claims.purpose != purpose {
            tracing::warn!(
                expected = %purpose,
                found = %claims.purpose,
                account_id = %claims.subject_id,
                "Token presented for the wrong purpose"
            );
            return Err(IdentityError::InvalidToken);
        }

        if claims.is_expired(self.now()) {
            tracing::warn!(%purpose, account_id = %claims.subject_id, "Expired token");
            return Err(IdentityError::TokenExpired);
        }

        Ok(claims)
    }

    async fn notify(&self, notification: &Notification) -> Result<()> {
        self.env.notifier.send(notification).await.inspect_err(|e| {
            tracing::error!(kind = ?notification.kind, error = %e, "Notification delivery failed");
        })
    }
}

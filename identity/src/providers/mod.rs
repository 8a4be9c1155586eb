//! Collaborator interfaces.
//!
//! The identity core depends on three external capabilities, expressed as
//! traits so the service can run against mocks, PostgreSQL, or anything
//! else that honours the contracts:
//!
//! - [`AccountStore`]: lookup by id, email, or login identifier, plus an
//!   **atomic conditional update** keyed on the fields the core checks.
//! - [`CredentialStore`]: secret verification and replacement. The core
//!   never reads secret hashes itself.
//! - [`Notifier`]: delivers a message containing a generated link.
//!
//! ```text
//! IdentityService ──▶ TokenCodec
//!        │
//!        ├──▶ AccountStore.update_if(id, Precondition, AccountPatch)
//!        │        (single compare-and-swap per transition)
//!        ├──▶ CredentialStore
//!        └──▶ Notifier
//! ```

use crate::state::Account;
use chrono::{DateTime, Utc};

pub mod account;
pub mod console_notifier;
pub mod credential;
pub mod notifier;
pub mod smtp_notifier;

// Re-export provider traits
pub use account::AccountStore;
pub use console_notifier::ConsoleNotifier;
pub use credential::{CredentialStore, hash_secret, verify_secret};
pub use notifier::{Notification, NotificationKind, Notifier};
pub use smtp_notifier::SmtpNotifier;

/// Field values an account must currently hold for a conditional update to
/// apply. `None` means "don't care".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Precondition {
    /// Current email must equal this value exactly.
    pub email: Option<String>,

    /// Current activation flag must equal this value.
    pub active: Option<bool>,

    /// Current activation token must be present and equal this value.
    pub activation_token: Option<String>,

    /// Current pending email must be present and equal this value.
    pub pending_email: Option<String>,

    /// Current credential epoch must equal this value.
    pub credential_epoch: Option<u64>,
}

impl Precondition {
    /// No constraint beyond the account existing.
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Require the current email.
    #[must_use]
    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Require the activation flag.
    #[must_use]
    pub const fn active(mut self, active: bool) -> Self {
        self.active = Some(active);
        self
    }

    /// Require the outstanding activation token.
    #[must_use]
    pub fn activation_token(mut self, token: impl Into<String>) -> Self {
        self.activation_token = Some(token.into());
        self
    }

    /// Require the pending email.
    #[must_use]
    pub fn pending_email(mut self, email: impl Into<String>) -> Self {
        self.pending_email = Some(email.into());
        self
    }

    /// Require the credential epoch.
    #[must_use]
    pub const fn credential_epoch(mut self, epoch: u64) -> Self {
        self.credential_epoch = Some(epoch);
        self
    }

    /// Check the precondition against an in-memory record.
    ///
    /// Token comparison is constant-time.
    #[must_use]
    pub fn matches(&self, account: &Account) -> bool {
        let email_ok = self.email.as_ref().is_none_or(|e| *e == account.email);
        let active_ok = self.active.is_none_or(|a| a == account.active);
        let token_ok = self.activation_token.as_ref().is_none_or(|expected| {
            account.activation_token.as_ref().is_some_and(|current| {
                constant_time_eq::constant_time_eq(expected.as_bytes(), current.as_bytes())
            })
        });
        let pending_ok = self
            .pending_email
            .as_ref()
            .is_none_or(|p| account.pending_email.as_ref() == Some(p));
        let epoch_ok = self
            .credential_epoch
            .is_none_or(|e| e == account.credential_epoch);

        email_ok && active_ok && token_ok && pending_ok && epoch_ok
    }
}

/// Field changes applied by a conditional update. `None` leaves the field
/// untouched; for nullable fields `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountPatch {
    /// New email.
    pub email: Option<String>,

    /// New pending email.
    pub pending_email: Option<Option<String>>,

    /// New activation flag.
    pub active: Option<bool>,

    /// New activation token.
    pub activation_token: Option<Option<String>>,

    /// New username.
    pub username: Option<String>,

    /// New given name.
    pub first_name: Option<String>,

    /// New family name.
    pub last_name: Option<String>,

    /// Increment the credential epoch.
    pub bump_credential_epoch: bool,
}

impl AccountPatch {
    /// Apply the patch to an in-memory record.
    pub fn apply(&self, account: &mut Account, now: DateTime<Utc>) {
        if let Some(email) = &self.email {
            account.email.clone_from(email);
        }
        if let Some(pending) = &self.pending_email {
            account.pending_email.clone_from(pending);
        }
        if let Some(active) = self.active {
            account.active = active;
        }
        if let Some(token) = &self.activation_token {
            account.activation_token.clone_from(token);
        }
        if let Some(username) = &self.username {
            account.username.clone_from(username);
        }
        if let Some(first_name) = &self.first_name {
            account.first_name.clone_from(first_name);
        }
        if let Some(last_name) = &self.last_name {
            account.last_name.clone_from(last_name);
        }
        if self.bump_credential_epoch {
            account.credential_epoch += 1;
        }
        account.updated_at = now;
    }
}

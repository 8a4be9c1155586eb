//! Account data types.
//!
//! These are plain records. All mutation logic lives in
//! [`IdentityService`](crate::service::IdentityService); stores only apply
//! the [`AccountPatch`](crate::providers::AccountPatch) they are handed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// ═══════════════════════════════════════════════════════════════════════
// ID Types
// ═══════════════════════════════════════════════════════════════════════

/// Stable primary key of an account, assigned by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AccountId(pub i64);

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Account
// ═══════════════════════════════════════════════════════════════════════

/// Identity record.
///
/// The secret hash is owned by the credential store and is not part of
/// this type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Primary key.
    pub id: AccountId,

    /// Login and notification address. Unique (case-insensitive).
    pub email: String,

    /// Target of an in-flight email change.
    pub pending_email: Option<String>,

    /// Login and display name. Unique (case-insensitive).
    pub username: String,

    /// Given name.
    pub first_name: String,

    /// Family name.
    pub last_name: String,

    /// False until activation completes.
    pub active: bool,

    /// Outstanding activation token, cleared on activation.
    pub activation_token: Option<String>,

    /// Bumped on every secret change; binds password-reset tokens.
    pub credential_epoch: u64,

    /// Creation timestamp.
    pub created_at: DateTime<Utc>,

    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// Activation sub-protocol state derived from the record.
    #[must_use]
    pub const fn activation_state(&self) -> ActivationState {
        match (self.active, self.activation_token.is_some()) {
            (true, _) => ActivationState::Active,
            (false, true) => ActivationState::ActivationRequested,
            (false, false) => ActivationState::Pending,
        }
    }

    /// Whether an email change is in flight.
    #[must_use]
    pub const fn has_pending_email(&self) -> bool {
        self.pending_email.is_some()
    }
}

/// Activation state of an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivationState {
    /// Inactive, no token issued.
    Pending,
    /// Inactive, activation token outstanding.
    ActivationRequested,
    /// Activated.
    Active,
}

/// Fields for a new account; the store assigns id and timestamps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAccount {
    /// Email address.
    pub email: String,
    /// Username.
    pub username: String,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Initial activation flag.
    pub active: bool,
}

/// Registration input.
#[derive(Clone, PartialEq, Eq)]
pub struct Registration {
    /// Email address.
    pub email: String,
    /// Username.
    pub username: String,
    /// Plain-text secret, handed straight to the credential store.
    pub secret: String,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("email", &self.email)
            .field("username", &self.username)
            .field("secret", &"<redacted>")
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .finish()
    }
}

/// Profile fields a user may edit. `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    /// New username.
    pub username: Option<String>,
    /// New given name.
    pub first_name: Option<String>,
    /// New family name.
    pub last_name: Option<String>,
}

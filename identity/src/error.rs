//! Error types for account identity operations.

use thiserror::Error;

/// Result type alias for identity operations.
pub type Result<T> = std::result::Result<T, IdentityError>;

/// Error taxonomy for the account identity lifecycle.
///
/// Expected outcomes (bad tokens, taken addresses, failed logins) are
/// ordinary variants returned to the caller. Collaborator faults carry a
/// description and are propagated unchanged; nothing here is retried.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IdentityError {
    // ═══════════════════════════════════════════════════════════
    // Token Errors
    // ═══════════════════════════════════════════════════════════

    /// Token is malformed, unsigned, signed with another key or algorithm,
    /// or carries the wrong purpose for the operation.
    #[error("Invalid token")]
    InvalidToken,

    /// Token carries an `exp` claim that has passed.
    #[error("Token has expired")]
    TokenExpired,

    /// Token claims reference an email the account no longer has.
    #[error("Token no longer matches the account")]
    StaleToken,

    // ═══════════════════════════════════════════════════════════
    // Account State Errors
    // ═══════════════════════════════════════════════════════════

    /// No live account matches the lookup (deleted, or token superseded).
    #[error("Account not found")]
    AccountNotFound,

    /// Email address already belongs to another account.
    #[error("Email address is already taken")]
    EmailTaken,

    /// Username already belongs to another account.
    #[error("Username is already taken")]
    UsernameTaken,

    /// Email address is syntactically invalid.
    #[error("Invalid email address")]
    InvalidEmail,

    /// Activation requested for an account that is already active.
    #[error("Account is already active")]
    AlreadyActive,

    /// The account changed between read and conditional write.
    #[error("Account was modified concurrently")]
    Conflict,

    // ═══════════════════════════════════════════════════════════
    // Authentication
    // ═══════════════════════════════════════════════════════════

    /// Login failed. Deliberately does not say why.
    #[error("Invalid credentials")]
    AuthFailure,

    // ═══════════════════════════════════════════════════════════
    // Collaborator Faults
    // ═══════════════════════════════════════════════════════════

    /// Account store failure (connectivity, storage fault).
    #[error("Account store error: {0}")]
    Store(String),

    /// Credential store failure.
    #[error("Credential store error: {0}")]
    Credential(String),

    /// Notification delivery failure.
    #[error("Notification delivery failed: {0}")]
    Notification(String),

    /// Internal error (should not be exposed to users).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IdentityError {
    /// Returns `true` for outcomes the caller is expected to handle
    /// (rejections rather than faults).
    ///
    /// # Examples
    ///
    /// ```
    /// # use account_identity::IdentityError;
    /// assert!(IdentityError::InvalidToken.is_expected());
    /// assert!(!IdentityError::Store("down".into()).is_expected());
    /// ```
    #[must_use]
    pub const fn is_expected(&self) -> bool {
        !self.is_fatal()
    }

    /// Returns `true` if this error comes from a failing collaborator.
    ///
    /// # Examples
    ///
    /// ```
    /// # use account_identity::IdentityError;
    /// assert!(IdentityError::Notification("smtp".into()).is_fatal());
    /// assert!(!IdentityError::EmailTaken.is_fatal());
    /// ```
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::Store(_) | Self::Credential(_) | Self::Notification(_) | Self::Internal(_)
        )
    }
}

//! Signed claim tokens.
//!
//! A token is a compact JWS (HS256) over a [`TokenClaims`] payload. It is
//! never stored as a value of its own: it lives in an account's
//! `activation_token` field or inside a link, and every consumer re-reads
//! the account before trusting anything beyond the addressing claims.
//!
//! # Security
//!
//! - The algorithm is pinned to HS256. The header is checked before the
//!   signature, so `none`, RS*, or any other algorithm is refused outright.
//! - Expiry is not enforced here. `exp` is carried as plain data and the
//!   service decides what to do with it.
//! - Output is base64url segments joined by `.`, safe to embed in a URL path.

use crate::config::IdentityConfig;
use crate::state::{Account, AccountId};
use chrono::{DateTime, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Pinned signing algorithm.
pub const ALGORITHM: Algorithm = Algorithm::HS256;

/// What a token authorises.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TokenPurpose {
    /// Account activation.
    Activate,
    /// Confirm a pending email address. `extra` is the candidate email.
    ChangeEmail,
    /// Reset the account secret. `extra` is the credential epoch.
    ResetPassword,
}

impl TokenPurpose {
    /// Wire name of the purpose.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Activate => "activate",
            Self::ChangeEmail => "change-email",
            Self::ResetPassword => "reset-password",
        }
    }

    /// Whether the purpose requires an `extra` claim.
    #[must_use]
    pub const fn requires_extra(&self) -> bool {
        matches!(self, Self::ChangeEmail | Self::ResetPassword)
    }
}

impl fmt::Display for TokenPurpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Claim set embedded in a token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject account id.
    #[serde(rename = "uid")]
    pub subject_id: AccountId,

    /// Subject email at issuance time.
    #[serde(rename = "email")]
    pub subject_email: String,

    /// What the token authorises.
    pub purpose: TokenPurpose,

    /// Purpose-specific payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra: Option<String>,

    /// Issued-at, seconds since the Unix epoch.
    pub iat: i64,

    /// Expiry, seconds since the Unix epoch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
}

impl TokenClaims {
    /// Claims for an activation token.
    #[must_use]
    pub fn activation(account: &Account, issued_at: DateTime<Utc>) -> Self {
        Self::for_account(account, TokenPurpose::Activate, None, issued_at)
    }

    /// Claims for an email-change token targeting `candidate`.
    #[must_use]
    pub fn email_change(account: &Account, candidate: &str, issued_at: DateTime<Utc>) -> Self {
        Self::for_account(
            account,
            TokenPurpose::ChangeEmail,
            Some(candidate.to_string()),
            issued_at,
        )
    }

    /// Claims for a password-reset token bound to the current credential epoch.
    #[must_use]
    pub fn password_reset(account: &Account, issued_at: DateTime<Utc>) -> Self {
        Self::for_account(
            account,
            TokenPurpose::ResetPassword,
            Some(account.credential_epoch.to_string()),
            issued_at,
        )
    }

    fn for_account(
        account: &Account,
        purpose: TokenPurpose,
        extra: Option<String>,
        issued_at: DateTime<Utc>,
    ) -> Self {
        Self {
            subject_id: account.id,
            subject_email: account.email.clone(),
            purpose,
            extra,
            iat: issued_at.timestamp(),
            exp: None,
        }
    }

    /// Set an expiry `ttl` after `iat`, rounding a partial second up.
    #[must_use]
    pub fn expiring_after(mut self, ttl: chrono::Duration) -> Self {
        let mut seconds = ttl.num_seconds();
        if ttl.subsec_nanos() > 0 {
            seconds += 1;
        }
        self.exp = Some(self.iat.saturating_add(seconds));
        self
    }

    /// Whether `exp` is present and has passed at `now`.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.exp.is_some_and(|exp| now.timestamp() >= exp)
    }

    fn check_purpose_fields(&self) -> Result<(), DecodeError> {
        match (self.purpose.requires_extra(), self.extra.is_some()) {
            (true, false) => Err(DecodeError::MissingClaim("extra")),
            (false, true) => Err(DecodeError::UnexpectedClaim("extra")),
            _ => Ok(()),
        }
    }
}

/// Reasons a token string fails to decode.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// Not a well-formed token, or the payload is not a claim set.
    #[error("Malformed token")]
    Malformed,

    /// Header names an algorithm other than the pinned one.
    #[error("Unexpected signing algorithm")]
    WrongAlgorithm,

    /// Signature does not verify under the configured key.
    #[error("Invalid signature")]
    BadSignature,

    /// Claim required by the token's purpose is absent.
    #[error("Missing claim: {0}")]
    MissingClaim(&'static str),

    /// Claim not allowed for the token's purpose is present.
    #[error("Unexpected claim: {0}")]
    UnexpectedClaim(&'static str),
}

impl From<DecodeError> for crate::error::IdentityError {
    fn from(_: DecodeError) -> Self {
        Self::InvalidToken
    }
}

/// Encodes and decodes signed claim sets.
#[derive(Clone)]
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenCodec {
    /// Create a codec signing with `signing_key`.
    #[must_use]
    pub fn new(signing_key: &[u8]) -> Self {
        let mut validation = Validation::new(ALGORITHM);
        // Expiry is the caller's decision; no registered claim is mandatory.
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();

        Self {
            encoding_key: EncodingKey::from_secret(signing_key),
            decoding_key: DecodingKey::from_secret(signing_key),
            validation,
        }
    }

    /// Create a codec from configuration.
    #[must_use]
    pub fn from_config(config: &IdentityConfig) -> Self {
        Self::new(&config.signing_key)
    }

    /// Sign `claims` into a URL-safe token string.
    ///
    /// # Errors
    ///
    /// Returns `IdentityError::Internal` if serialization fails, which does
    /// not happen for claim sets built from this module's types.
    pub fn encode(&self, claims: &TokenClaims) -> crate::error::Result<String> {
        jsonwebtoken::encode(&Header::new(ALGORITHM), claims, &self.encoding_key)
            .map_err(|e| crate::error::IdentityError::Internal(format!("Token encoding failed: {e}")))
    }

    /// Verify and decode a token string.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError`] if the token is malformed, uses another
    /// algorithm, fails signature verification, or lacks the claims its
    /// purpose requires.
    pub fn decode(&self, token: &str) -> Result<TokenClaims, DecodeError> {
        let header = jsonwebtoken::decode_header(token).map_err(|_| DecodeError::Malformed)?;
        if header.alg != ALGORITHM {
            return Err(DecodeError::WrongAlgorithm);
        }

        let data = jsonwebtoken::decode::<TokenClaims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature => DecodeError::BadSignature,
                ErrorKind::InvalidAlgorithm => DecodeError::WrongAlgorithm,
                _ => DecodeError::Malformed,
            })?;

        data.claims.check_purpose_fields()?;
        Ok(data.claims)
    }
}

impl fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenCodec")
            .field("algorithm", &ALGORITHM)
            .finish_non_exhaustive()
    }
}

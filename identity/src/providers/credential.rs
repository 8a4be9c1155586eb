//! Credential store trait and Argon2id hashing helpers.

use crate::error::{IdentityError, Result};
use crate::state::Account;
use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};

/// Credential store.
///
/// Owns secret hashes. The identity core only asks it to verify or replace
/// a secret and never sees the stored hash.
pub trait CredentialStore: Send + Sync {
    /// Verify `secret` against the account's stored hash.
    ///
    /// # Returns
    ///
    /// `false` when the secret is wrong or no hash is stored.
    ///
    /// # Errors
    ///
    /// Returns `IdentityError::Credential` if the store fails.
    fn verify(
        &self,
        account: &Account,
        secret: &str,
    ) -> impl std::future::Future<Output = Result<bool>> + Send;

    /// Replace the account's secret.
    ///
    /// # Errors
    ///
    /// Returns `IdentityError::Credential` if hashing or storage fails.
    fn set_secret(
        &self,
        account: &Account,
        secret: &str,
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// Hash a secret with Argon2id and a random salt.
///
/// Returns a PHC-formatted string that embeds algorithm, parameters and salt.
///
/// # Errors
///
/// Returns `IdentityError::Credential` if hashing fails.
pub fn hash_secret(secret: &str) -> Result<String> {
    let salt = SaltString::generate(&mut rand::rngs::OsRng);
    Argon2::default()
        .hash_password(secret.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| IdentityError::Credential(format!("Hashing failed: {e}")))
}

/// Verify a secret against a PHC-formatted Argon2 hash.
///
/// # Errors
///
/// Returns `IdentityError::Credential` if the stored hash cannot be parsed.
pub fn verify_secret(secret: &str, phc_hash: &str) -> Result<bool> {
    let parsed = PasswordHash::new(phc_hash)
        .map_err(|e| IdentityError::Credential(format!("Unreadable hash: {e}")))?;
    Ok(Argon2::default()
        .verify_password(secret.as_bytes(), &parsed)
        .is_ok())
}

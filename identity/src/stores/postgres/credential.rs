//! PostgreSQL credential store.
//!
//! Keeps an Argon2id PHC string in `accounts.secret_hash`. Hashing runs on
//! the blocking pool.

use crate::error::{IdentityError, Result};
use crate::providers::{CredentialStore, hash_secret, verify_secret};
use crate::state::Account;
use sqlx::PgPool;

/// `PostgreSQL` credential store.
#[derive(Clone)]
pub struct PostgresCredentialStore {
    /// `PostgreSQL` connection pool.
    pool: PgPool,
}

impl PostgresCredentialStore {
    /// Create a new `PostgreSQL` credential store.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl CredentialStore for PostgresCredentialStore {
    async fn verify(&self, account: &Account, secret: &str) -> Result<bool> {
        let stored: Option<Option<String>> =
            sqlx::query_scalar("SELECT secret_hash FROM accounts WHERE id = $1")
                .bind(account.id.0)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| IdentityError::Credential(format!("Failed to load hash: {e}")))?;

        let Some(hash) = stored.flatten() else {
            return Ok(false);
        };

        let secret = secret.to_string();
        tokio::task::spawn_blocking(move || verify_secret(&secret, &hash))
            .await
            .map_err(|e| IdentityError::Credential(format!("Verification task failed: {e}")))?
    }

    async fn set_secret(&self, account: &Account, secret: &str) -> Result<()> {
        let secret = secret.to_string();
        let hash = tokio::task::spawn_blocking(move || hash_secret(&secret))
            .await
            .map_err(|e| IdentityError::Credential(format!("Hashing task failed: {e}")))??;

        let result = sqlx::query("UPDATE accounts SET secret_hash = $2, updated_at = NOW() WHERE id = $1")
            .bind(account.id.0)
            .bind(hash)
            .execute(&self.pool)
            .await
            .map_err(|e| IdentityError::Credential(format!("Failed to store hash: {e}")))?;

        if result.rows_affected() == 0 {
            return Err(IdentityError::AccountNotFound);
        }
        Ok(())
    }
}

//! PostgreSQL account store.
//!
//! # Example
//!
//! ```no_run
//! use account_identity::stores::PostgresAccountStore;
//! use sqlx::PgPool;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = PgPool::connect("postgresql://localhost/identity").await?;
//! let store = PostgresAccountStore::new(pool);
//! store.migrate().await?;
//! # Ok(())
//! # }
//! ```

use crate::error::{IdentityError, Result};
use crate::providers::{AccountPatch, AccountStore, Precondition};
use crate::state::{Account, AccountId, NewAccount};
use chrono::{DateTime, Utc};
use sqlx::PgPool;

/// Unique index on `LOWER(email)`.
const EMAIL_KEY: &str = "accounts_email_key";

/// Unique index on `LOWER(username)`.
const USERNAME_KEY: &str = "accounts_username_key";

const ACCOUNT_COLUMNS: &str = "id, email, pending_email, username, first_name, last_name, \
     active, activation_token, credential_epoch, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct AccountRow {
    id: i64,
    email: String,
    pending_email: Option<String>,
    username: String,
    first_name: String,
    last_name: String,
    active: bool,
    activation_token: Option<String>,
    credential_epoch: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<AccountRow> for Account {
    fn from(row: AccountRow) -> Self {
        Self {
            id: AccountId(row.id),
            email: row.email,
            pending_email: row.pending_email,
            username: row.username,
            first_name: row.first_name,
            last_name: row.last_name,
            active: row.active,
            activation_token: row.activation_token,
            // The schema keeps the epoch non-negative.
            credential_epoch: u64::try_from(row.credential_epoch).unwrap_or_default(),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Map a write failure, turning unique violations into the matching error.
fn write_error(e: sqlx::Error, context: &str) -> IdentityError {
    if let sqlx::Error::Database(db) = &e {
        if db.is_unique_violation() {
            match db.constraint() {
                Some(EMAIL_KEY) => return IdentityError::EmailTaken,
                Some(USERNAME_KEY) => return IdentityError::UsernameTaken,
                _ => {}
            }
        }
    }
    IdentityError::Store(format!("{context}: {e}"))
}

fn epoch_param(epoch: u64) -> Result<i64> {
    i64::try_from(epoch)
        .map_err(|_| IdentityError::Store(format!("Credential epoch out of range: {epoch}")))
}

/// `PostgreSQL` account store.
#[derive(Clone)]
pub struct PostgresAccountStore {
    /// `PostgreSQL` connection pool.
    pool: PgPool,
}

impl PostgresAccountStore {
    /// Create a new `PostgreSQL` account store.
    ///
    /// # Arguments
    ///
    /// * `pool` - `PostgreSQL` connection pool
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Run database migrations.
    ///
    /// # Errors
    ///
    /// Returns error if migrations fail.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| IdentityError::Store(format!("Migration failed: {e}")))?;
        Ok(())
    }
}

impl AccountStore for PostgresAccountStore {
    async fn get_by_id(&self, id: AccountId) -> Result<Account> {
        let sql = format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id = $1");
        sqlx::query_as::<_, AccountRow>(&sql)
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| IdentityError::Store(format!("Failed to get account: {e}")))?
            .map(Account::from)
            .ok_or(IdentityError::AccountNotFound)
    }

    async fn get_by_email(&self, email: &str) -> Result<Account> {
        let sql = format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE LOWER(email) = LOWER($1)");
        sqlx::query_as::<_, AccountRow>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| IdentityError::Store(format!("Failed to get account by email: {e}")))?
            .map(Account::from)
            .ok_or(IdentityError::AccountNotFound)
    }

    async fn find_by_login(&self, identifier: &str) -> Result<Vec<Account>> {
        let sql = format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts \
             WHERE LOWER(username) = LOWER($1) OR LOWER(email) = LOWER($1) \
             ORDER BY id"
        );
        let rows = sqlx::query_as::<_, AccountRow>(&sql)
            .bind(identifier)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| IdentityError::Store(format!("Failed to find accounts: {e}")))?;

        Ok(rows.into_iter().map(Account::from).collect())
    }

    async fn insert(&self, account: &NewAccount) -> Result<Account> {
        let sql = format!(
            "INSERT INTO accounts (email, username, first_name, last_name, active) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {ACCOUNT_COLUMNS}"
        );
        let row = sqlx::query_as::<_, AccountRow>(&sql)
            .bind(&account.email)
            .bind(&account.username)
            .bind(&account.first_name)
            .bind(&account.last_name)
            .bind(account.active)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| write_error(e, "Failed to insert account"))?;

        tracing::debug!(account_id = row.id, "Inserted account");
        Ok(row.into())
    }

    async fn update_if(
        &self,
        id: AccountId,
        expected: &Precondition,
        patch: &AccountPatch,
    ) -> Result<Option<Account>> {
        // Precondition and write run as one statement, so a concurrent
        // consumer either sees the old row (and wins) or the new one (and misses).
        let sql = format!(
            "UPDATE accounts SET \
                 email = COALESCE($7::TEXT, email), \
                 pending_email = CASE WHEN $8 THEN $9::TEXT ELSE pending_email END, \
                 active = COALESCE($10::BOOLEAN, active), \
                 activation_token = CASE WHEN $11 THEN $12::TEXT ELSE activation_token END, \
                 username = COALESCE($13::TEXT, username), \
                 first_name = COALESCE($14::TEXT, first_name), \
                 last_name = COALESCE($15::TEXT, last_name), \
                 credential_epoch = credential_epoch + CASE WHEN $16 THEN 1 ELSE 0 END, \
                 updated_at = NOW() \
             WHERE id = $1 \
                 AND ($2::TEXT IS NULL OR email = $2) \
                 AND ($3::BOOLEAN IS NULL OR active = $3) \
                 AND ($4::TEXT IS NULL OR activation_token = $4) \
                 AND ($5::TEXT IS NULL OR pending_email = $5) \
                 AND ($6::BIGINT IS NULL OR credential_epoch = $6) \
             RETURNING {ACCOUNT_COLUMNS}"
        );

        let expected_epoch = expected.credential_epoch.map(epoch_param).transpose()?;

        let row = sqlx::query_as::<_, AccountRow>(&sql)
            .bind(id.0)
            .bind(expected.email.as_deref())
            .bind(expected.active)
            .bind(expected.activation_token.as_deref())
            .bind(expected.pending_email.as_deref())
            .bind(expected_epoch)
            .bind(patch.email.as_deref())
            .bind(patch.pending_email.is_some())
            .bind(patch.pending_email.clone().flatten())
            .bind(patch.active)
            .bind(patch.activation_token.is_some())
            .bind(patch.activation_token.clone().flatten())
            .bind(patch.username.as_deref())
            .bind(patch.first_name.as_deref())
            .bind(patch.last_name.as_deref())
            .bind(patch.bump_credential_epoch)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| write_error(e, "Failed to update account"))?;

        if row.is_none() {
            tracing::debug!(account_id = %id, "Conditional update matched no row");
        }

        Ok(row.map(Account::from))
    }
}

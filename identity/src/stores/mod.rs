//! Storage implementations for the identity core.
//!
//! - **Account Store** (PostgreSQL) - Accounts with atomic conditional updates
//! - **Credential Store** (PostgreSQL) - Argon2id hashes kept beside the account row

pub mod postgres;

// Re-exports
pub use postgres::{PostgresAccountStore, PostgresCredentialStore};

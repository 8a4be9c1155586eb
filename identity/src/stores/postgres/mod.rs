//! PostgreSQL storage implementations.
//!
//! Both stores share the `accounts` table created by `migrations/`.

pub mod account;
pub mod credential;

// Re-exports
pub use account::PostgresAccountStore;
pub use credential::PostgresCredentialStore;

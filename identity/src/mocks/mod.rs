//! Mock collaborator implementations for testing.
//!
//! In-memory, deterministic implementations of all provider traits. The
//! account store keeps the same atomicity and uniqueness guarantees a real
//! store must provide, so service tests exercise the real contracts.

pub mod account;
pub mod credential;
pub mod notifier;

pub use account::MockAccountStore;
pub use credential::MockCredentialStore;
pub use notifier::MockNotifier;

//! # Account Identity
//!
//! Account activation, email change, and password reset driven by
//! stateless signed tokens.
//!
//! ## Features
//!
//! - **No token table**: links carry a signed claim set; whether a link is
//!   still good is decided by the account record at the moment of use
//! - **Single use**: every consumption is one atomic conditional update
//! - **Swappable collaborators**: account store, credential store and
//!   notifier are traits, with mock, console, SMTP and PostgreSQL adapters
//! - **Opaque login**: unknown user and wrong secret look the same
//!
//! ## Architecture
//!
//! ```text
//! request_*  ─▶ TokenCodec.encode ─▶ AccountStore.update_if ─▶ Notifier.send
//! consume_*  ─▶ TokenCodec.decode ─▶ AccountStore.update_if ─▶ Account
//! resolve    ─▶ AccountStore.find_by_login ─▶ CredentialStore.verify
//! ```
//!
//! ## Example: Activation
//!
//! ```rust,ignore
//! use account_identity::*;
//! use account_identity::mocks::*;
//!
//! let env = IdentityEnvironment::new(
//!     MockAccountStore::new(),
//!     MockCredentialStore::new(),
//!     MockNotifier::new(),
//! );
//! let service = IdentityService::new(IdentityConfig::from_env()?, env);
//!
//! // 1. Register: stores the secret and sends the activation link
//! let account = service.register(&registration).await?;
//!
//! // 2. The link's last path segment is the token
//! let active = service.consume_activation(&token).await?;
//! assert!(active.active);
//! ```

#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]

// Public modules
pub mod authenticator;
pub mod config;
pub mod environment;
pub mod error;
pub mod mailer;
pub mod providers;
pub mod service;
pub mod state;
pub mod token;
pub mod utils;

// Storage implementations
#[cfg(feature = "postgres")]
pub mod stores;

// Mock implementations for testing
#[cfg(any(test, feature = "test-utils"))]
pub mod mocks;

// Re-export main types for convenience
pub use authenticator::Authenticator;
pub use config::{ConfigError, IdentityConfig};
pub use environment::{Clock, IdentityEnvironment, SystemClock};
pub use error::{IdentityError, Result};
pub use service::IdentityService;
pub use state::{Account, AccountId, ActivationState, ProfileUpdate, Registration};
pub use token::{TokenClaims, TokenCodec, TokenPurpose};

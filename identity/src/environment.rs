//! Identity environment.
//!
//! Bundles the collaborators the identity core depends on, so they can be
//! swapped for mocks in tests.

use crate::providers::{AccountStore, CredentialStore, Notifier};
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Clock trait - abstracts time operations for testability.
pub trait Clock: Send + Sync {
    /// Get the current time.
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Identity environment.
///
/// # Type Parameters
///
/// - `A`: Account store
/// - `C`: Credential store
/// - `N`: Notifier
#[derive(Clone)]
pub struct IdentityEnvironment<A, C, N>
where
    A: AccountStore + Clone,
    C: CredentialStore + Clone,
    N: Notifier + Clone,
{
    /// Account store (lookup and conditional update).
    pub accounts: A,

    /// Credential store (secret hashing and verification).
    pub credentials: C,

    /// Notification dispatcher.
    pub notifier: N,

    /// Time source for `iat`/`exp`.
    pub clock: Arc<dyn Clock>,
}

impl<A, C, N> IdentityEnvironment<A, C, N>
where
    A: AccountStore + Clone,
    C: CredentialStore + Clone,
    N: Notifier + Clone,
{
    /// Create a new environment using the system clock.
    #[must_use]
    pub fn new(accounts: A, credentials: C, notifier: N) -> Self {
        Self {
            accounts,
            credentials,
            notifier,
            clock: Arc::new(SystemClock),
        }
    }

    /// Replace the clock.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }
}

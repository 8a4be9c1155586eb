//! Service harness over mock collaborators.
//!
//! Builds an [`IdentityService`] whose store, credentials, notifier and
//! clock are all exposed, so a test can drive a flow and then inspect what
//! was persisted and sent.

use crate::mocks::{FixedClock, test_clock};
use account_identity::mocks::{MockAccountStore, MockCredentialStore, MockNotifier};
use account_identity::{Authenticator, IdentityConfig, IdentityEnvironment, IdentityService};
use chrono::Duration;
use std::sync::Arc;

/// Signing key used by harnesses unless overridden.
pub const TEST_SIGNING_KEY: &[u8] = b"brooklyn-nine-nine-test-signing-key";

/// Base URL used by harnesses.
pub const TEST_BASE_URL: &str = "https://b99.com";

/// Identity service wired to mocks.
pub type MockIdentityService = IdentityService<MockAccountStore, MockCredentialStore, MockNotifier>;

/// Service plus handles on everything behind it.
#[derive(Clone)]
pub struct TestHarness {
    /// Service under test.
    pub service: MockIdentityService,
    /// Account store shared with the service.
    pub accounts: MockAccountStore,
    /// Credential store shared with the service.
    pub credentials: MockCredentialStore,
    /// Notifier shared with the service.
    pub notifier: MockNotifier,
    /// Clock shared with the service.
    pub clock: FixedClock,
}

impl TestHarness {
    /// Harness with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Start configuring a harness.
    #[must_use]
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::default()
    }

    /// Login resolver over the same stores.
    #[must_use]
    pub fn authenticator(&self) -> Authenticator<MockAccountStore, MockCredentialStore> {
        self.service.authenticator()
    }

    /// Token from the most recently sent link (its last path segment).
    #[must_use]
    pub fn last_token(&self) -> Option<String> {
        self.notifier
            .last()
            .and_then(|n| n.link.rsplit('/').next().map(str::to_string))
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for [`TestHarness`].
#[derive(Debug, Clone)]
pub struct TestHarnessBuilder {
    signing_key: Vec<u8>,
    token_ttl: Option<Duration>,
    allow_inactive_login: bool,
    notifier: MockNotifier,
    clock: FixedClock,
}

impl Default for TestHarnessBuilder {
    fn default() -> Self {
        Self {
            signing_key: TEST_SIGNING_KEY.to_vec(),
            token_ttl: None,
            allow_inactive_login: false,
            notifier: MockNotifier::new(),
            clock: test_clock(),
        }
    }
}

impl TestHarnessBuilder {
    /// Sign with a different key.
    #[must_use]
    pub fn with_signing_key(mut self, key: &[u8]) -> Self {
        self.signing_key = key.to_vec();
        self
    }

    /// Mint tokens that expire after `ttl`.
    #[must_use]
    pub const fn with_token_ttl(mut self, ttl: Duration) -> Self {
        self.token_ttl = Some(ttl);
        self
    }

    /// Let inactive accounts log in.
    #[must_use]
    pub const fn with_inactive_login(mut self, allow: bool) -> Self {
        self.allow_inactive_login = allow;
        self
    }

    /// Make every notification delivery fail.
    #[must_use]
    pub fn with_failing_notifier(mut self) -> Self {
        self.notifier = MockNotifier::failing();
        self
    }

    /// Build the harness.
    #[must_use]
    pub fn build(self) -> TestHarness {
        let mut config = IdentityConfig::new(self.signing_key, TEST_BASE_URL)
            .with_site_title("Brooklyn 99")
            .with_inactive_login(self.allow_inactive_login);
        if let Some(ttl) = self.token_ttl {
            config = config.with_token_ttl(ttl);
        }

        let accounts = MockAccountStore::new();
        let credentials = MockCredentialStore::new();
        let env = IdentityEnvironment::new(accounts.clone(), credentials.clone(), self.notifier.clone())
            .with_clock(Arc::new(self.clock.clone()));

        TestHarness {
            service: IdentityService::new(config, env),
            accounts,
            credentials,
            notifier: self.notifier,
            clock: self.clock,
        }
    }
}

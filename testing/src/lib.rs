//! # Account Identity Testing
//!
//! Testing utilities and helpers for the account identity crate.
//!
//! This crate provides:
//! - A controllable clock for expiry tests
//! - A harness wiring the identity service to mock collaborators
//! - Seed accounts with known secrets
//!
//! ## Example
//!
//! ```ignore
//! use account_identity_testing::{TestHarness, fixtures};
//!
//! #[tokio::test]
//! async fn test_login() {
//!     let harness = TestHarness::new();
//!     let jake = fixtures::create_jake(&harness).await?;
//!
//!     let resolved = harness
//!         .authenticator()
//!         .resolve("baracuda", fixtures::JAKE_SECRET)
//!         .await?;
//!     assert_eq!(resolved.id, jake.id);
//! }
//! ```

pub mod fixtures;
pub mod harness;

/// Mock implementations of environment traits.
pub mod mocks {
    use account_identity::Clock;
    use chrono::{DateTime, Duration, Utc};
    use std::sync::{Arc, Mutex};

    /// Fixed clock for deterministic tests
    ///
    /// Returns the same time until [`advance`](Self::advance) moves it.
    /// Clones share the same time.
    ///
    /// # Example
    ///
    /// ```
    /// use account_identity::Clock;
    /// use account_identity_testing::mocks::FixedClock;
    /// use chrono::{Duration, Utc};
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// let before = clock.now();
    /// assert_eq!(before, clock.now());
    ///
    /// clock.advance(Duration::minutes(5));
    /// assert_eq!(clock.now() - before, Duration::minutes(5));
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: Arc<Mutex<DateTime<Utc>>>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub fn new(time: DateTime<Utc>) -> Self {
            Self {
                time: Arc::new(Mutex::new(time)),
            }
        }

        /// Move the clock forward.
        pub fn advance(&self, by: Duration) {
            let mut time = self
                .time
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            *time += by;
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            *self
                .time
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner)
        }
    }

    /// Create a default fixed clock for tests (2025-01-01 00:00:00 UTC)
    #[must_use]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(DateTime::<Utc>::from_timestamp(1_735_689_600, 0).unwrap_or_default())
    }
}

/// Install a test-friendly tracing subscriber.
///
/// Honors `RUST_LOG`; output goes through the test harness capture. Safe to
/// call from every test.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}

// Re-export commonly used items
pub use harness::{TestHarness, TestHarnessBuilder};
pub use mocks::{FixedClock, test_clock};

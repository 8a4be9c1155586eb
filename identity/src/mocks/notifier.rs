//! Mock notifier for testing.

use crate::error::{IdentityError, Result};
use crate::providers::{Notification, Notifier};
use std::sync::{Arc, Mutex};

/// Mock notifier.
///
/// Records every notification instead of delivering it.
#[derive(Debug, Clone)]
pub struct MockNotifier {
    sent: Arc<Mutex<Vec<Notification>>>,

    /// Whether to simulate success or failure.
    pub should_succeed: bool,
}

impl MockNotifier {
    /// Create a new mock notifier that succeeds.
    #[must_use]
    pub fn new() -> Self {
        Self {
            sent: Arc::new(Mutex::new(Vec::new())),
            should_succeed: true,
        }
    }

    /// Create a mock notifier whose deliveries fail.
    #[must_use]
    pub fn failing() -> Self {
        Self {
            should_succeed: false,
            ..Self::new()
        }
    }

    /// All notifications delivered so far.
    #[must_use]
    pub fn sent(&self) -> Vec<Notification> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }

    /// Most recent notification.
    #[must_use]
    pub fn last(&self) -> Option<Notification> {
        self.sent.lock().ok().and_then(|s| s.last().cloned())
    }

    /// Number of notifications delivered.
    #[must_use]
    pub fn count(&self) -> usize {
        self.sent.lock().map(|s| s.len()).unwrap_or_default()
    }
}

impl Default for MockNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier for MockNotifier {
    async fn send(&self, notification: &Notification) -> Result<()> {
        if !self.should_succeed {
            return Err(IdentityError::Notification("mock delivery failure".to_string()));
        }

        self.sent
            .lock()
            .map_err(|_| IdentityError::Internal("notifier lock poisoned".to_string()))?
            .push(notification.clone());
        Ok(())
    }
}

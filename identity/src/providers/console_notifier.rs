//! Console notifier for development.

use crate::error::Result;
use crate::providers::{Notification, Notifier};
use tracing::info;

/// Console notifier.
///
/// Logs messages instead of sending them. Useful for development where you
/// don't want to send real email but still need the link.
///
/// # Examples
///
/// ```ignore
/// use account_identity::providers::ConsoleNotifier;
///
/// let env = IdentityEnvironment::new(accounts, credentials, ConsoleNotifier::new());
/// ```
#[derive(Clone, Debug, Default)]
pub struct ConsoleNotifier;

impl ConsoleNotifier {
    /// Create a new console notifier.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Notifier for ConsoleNotifier {
    async fn send(&self, notification: &Notification) -> Result<()> {
        info!(
            kind = ?notification.kind,
            to = %notification.to,
            subject = %notification.subject,
            "Notification (development mode)"
        );
        println!("\n── {} ──", notification.subject);
        println!("To: {}", notification.to);
        println!();
        println!("{}", notification.body);
        println!();

        Ok(())
    }
}

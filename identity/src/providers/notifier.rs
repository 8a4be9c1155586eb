//! Notification dispatcher trait.

use crate::error::Result;

/// Which flow produced a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationKind {
    /// Account activation link.
    Activation,
    /// New-address confirmation link.
    EmailChange,
    /// Password reset link.
    PasswordReset,
}

/// A message containing a generated link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Flow that produced the message.
    pub kind: NotificationKind,

    /// Recipient address.
    pub to: String,

    /// Subject line.
    pub subject: String,

    /// Plain-text body; contains `link`.
    pub body: String,

    /// The generated link on its own, for transports that render HTML.
    pub link: String,
}

/// Notification dispatcher.
///
/// This trait abstracts over message delivery (SMTP, console, a queue).
pub trait Notifier: Send + Sync {
    /// Deliver a notification.
    ///
    /// # Errors
    ///
    /// Returns `IdentityError::Notification` if:
    /// - Network request fails
    /// - The transport rejects the message
    /// - The recipient address is invalid
    fn send(
        &self,
        notification: &Notification,
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

//! Link and message templates.
//!
//! Links have the form `{base_url}/{route}/{token}`; the token is the opaque
//! codec output and is already URL-safe.

use crate::config::IdentityConfig;
use crate::providers::{Notification, NotificationKind};

/// Route for activation links.
pub const ACTIVATION_ROUTE: &str = "activation";

/// Route for email-change confirmation links.
pub const VALIDATE_EMAIL_ROUTE: &str = "validate_email";

/// Route for password-reset links.
pub const RESET_PASSWORD_ROUTE: &str = "reset_password";

/// Builds links and notifications from configuration.
#[derive(Debug, Clone)]
pub struct Mailer {
    base_url: String,
    site_title: String,
}

impl Mailer {
    /// Create a mailer from configuration.
    #[must_use]
    pub fn from_config(config: &IdentityConfig) -> Self {
        Self {
            base_url: config.base_url().to_string(),
            site_title: config.site_title.clone(),
        }
    }

    /// `{base_url}/activation/{token}`
    #[must_use]
    pub fn activation_link(&self, token: &str) -> String {
        self.link(ACTIVATION_ROUTE, token)
    }

    /// `{base_url}/validate_email/{token}`
    #[must_use]
    pub fn email_change_link(&self, token: &str) -> String {
        self.link(VALIDATE_EMAIL_ROUTE, token)
    }

    /// `{base_url}/reset_password/{token}`
    #[must_use]
    pub fn password_reset_link(&self, token: &str) -> String {
        self.link(RESET_PASSWORD_ROUTE, token)
    }

    fn link(&self, route: &str, token: &str) -> String {
        format!("{}/{route}/{token}", self.base_url)
    }

    /// Activation message to the account's address.
    #[must_use]
    pub fn activation(&self, to: &str, token: &str) -> Notification {
        let link = self.activation_link(token);
        Notification {
            kind: NotificationKind::Activation,
            to: to.to_string(),
            subject: "Validate your email address".to_string(),
            body: format!(
                "To confirm your account please copy the following link in your browser: {link}"
            ),
            link,
        }
    }

    /// Email-change confirmation, sent to the account's current address.
    #[must_use]
    pub fn email_change(&self, to: &str, token: &str) -> Notification {
        let link = self.email_change_link(token);
        Notification {
            kind: NotificationKind::EmailChange,
            to: to.to_string(),
            subject: format!("Confirm your new email for {}", self.site_title),
            body: format!(
                "To confirm your new email please copy the following link in your browser: {link}"
            ),
            link,
        }
    }

    /// Password-reset message to the account's address.
    #[must_use]
    pub fn password_reset(&self, to: &str, token: &str) -> Notification {
        let link = self.password_reset_link(token);
        Notification {
            kind: NotificationKind::PasswordReset,
            to: to.to_string(),
            subject: format!("Reset your password for {}", self.site_title),
            body: format!(
                "To choose a new password please copy the following link in your browser: {link}\n\
                 If you didn't request this, you can safely ignore this message."
            ),
            link,
        }
    }
}

//! SMTP notifier implementation using Lettre.

use crate::error::{IdentityError, Result};
use crate::providers::{Notification, Notifier};
use lettre::message::header::ContentType;
use lettre::message::{Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};

/// SMTP notifier using Lettre.
///
/// Sends a multipart message: the plain-text body as built by the service,
/// plus a minimal HTML alternative carrying the same link.
///
/// # Examples
///
/// ```ignore
/// use account_identity::providers::SmtpNotifier;
///
/// let notifier = SmtpNotifier::new(
///     "smtp.example.com".to_string(),
///     587,
///     "mailer".to_string(),
///     "app_password".to_string(),
///     "noreply@example.com",
///     "Example App",
/// )?;
/// ```
#[derive(Clone)]
pub struct SmtpNotifier {
    /// SMTP server address.
    smtp_server: String,

    /// SMTP server port.
    smtp_port: u16,

    /// SMTP credentials.
    credentials: Credentials,

    /// Sender mailbox.
    from: Mailbox,
}

impl SmtpNotifier {
    /// Create a new SMTP notifier.
    ///
    /// # Errors
    ///
    /// Returns `IdentityError::Notification` if the sender address is invalid.
    pub fn new(
        smtp_server: String,
        smtp_port: u16,
        smtp_username: String,
        smtp_password: String,
        from_email: &str,
        from_name: &str,
    ) -> Result<Self> {
        let from = format!("{from_name} <{from_email}>")
            .parse()
            .map_err(|e| IdentityError::Notification(format!("Invalid from address: {e}")))?;

        Ok(Self {
            smtp_server,
            smtp_port,
            credentials: Credentials::new(smtp_username, smtp_password),
            from,
        })
    }

    /// Build SMTP transport for sending.
    ///
    /// A fresh transport per message avoids holding pooled connections open
    /// between rare sends.
    fn build_transport(&self) -> Result<SmtpTransport> {
        Ok(SmtpTransport::relay(&self.smtp_server)
            .map_err(|e| IdentityError::Notification(format!("SMTP relay error: {e}")))?
            .port(self.smtp_port)
            .credentials(self.credentials.clone())
            .build())
    }

    /// Build the message for a notification.
    fn build_message(&self, notification: &Notification) -> Result<Message> {
        let html_body = format!(
            r#"<!DOCTYPE html>
<html>
<head><meta charset="UTF-8"><title>{subject}</title></head>
<body style="font-family: Arial, sans-serif; line-height: 1.6; color: #333;">
    <div style="max-width: 600px; margin: 0 auto; padding: 20px;">
        <h2>{subject}</h2>
        <p><a href="{link}">{link}</a></p>
        <p style="color: #666; font-size: 14px;">If you didn't request this email, you can safely ignore it.</p>
    </div>
</body>
</html>"#,
            subject = notification.subject,
            link = notification.link,
        );

        Message::builder()
            .from(self.from.clone())
            .to(notification
                .to
                .parse()
                .map_err(|e| IdentityError::Notification(format!("Invalid to address: {e}")))?)
            .subject(notification.subject.clone())
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(notification.body.clone()),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(html_body),
                    ),
            )
            .map_err(|e| IdentityError::Notification(format!("Failed to build email: {e}")))
    }
}

impl Notifier for SmtpNotifier {
    async fn send(&self, notification: &Notification) -> Result<()> {
        let email = self.build_message(notification)?;
        let mailer = self.build_transport()?;

        tokio::task::spawn_blocking(move || {
            mailer
                .send(&email)
                .map_err(|e| IdentityError::Notification(format!("Failed to send email: {e}")))
        })
        .await
        .map_err(|e| IdentityError::Notification(format!("Email task failed: {e}")))??;

        tracing::info!(kind = ?notification.kind, "Notification sent via SMTP");
        Ok(())
    }
}

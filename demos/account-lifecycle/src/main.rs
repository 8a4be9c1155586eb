//! Account lifecycle demo
//!
//! Runs one account through every token-gated transition against in-memory
//! stores, printing each notification to the console.
//!
//! Set `IDENTITY_SIGNING_KEY` and `IDENTITY_BASE_URL` to use your own
//! configuration; otherwise a development key is used.

use account_identity::mocks::{MockAccountStore, MockCredentialStore};
use account_identity::providers::{ConsoleNotifier, Notification, Notifier};
use account_identity::{IdentityConfig, IdentityEnvironment, IdentityError, IdentityService, Registration};
use std::sync::{Arc, Mutex};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEV_SIGNING_KEY: &[u8] = b"development-only-signing-key-0123456789";

/// Prints like [`ConsoleNotifier`] and remembers the last link, standing in
/// for the user clicking it.
#[derive(Clone, Default)]
struct Inbox {
    console: ConsoleNotifier,
    last_link: Arc<Mutex<Option<String>>>,
}

impl Inbox {
    fn click(&self) -> anyhow::Result<String> {
        let link = self
            .last_link
            .lock()
            .map_err(|_| anyhow::anyhow!("inbox lock poisoned"))?
            .clone()
            .ok_or_else(|| anyhow::anyhow!("no link received"))?;
        link.rsplit('/')
            .next()
            .map(str::to_string)
            .ok_or_else(|| anyhow::anyhow!("link has no token"))
    }
}

impl Notifier for Inbox {
    async fn send(&self, notification: &Notification) -> account_identity::Result<()> {
        self.console.send(notification).await?;
        *self
            .last_link
            .lock()
            .map_err(|_| IdentityError::Notification("inbox lock poisoned".to_string()))? =
            Some(notification.link.clone());
        Ok(())
    }
}

fn load_config() -> IdentityConfig {
    IdentityConfig::from_env().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Falling back to development configuration");
        IdentityConfig::new(DEV_SIGNING_KEY, "http://localhost:8000").with_site_title("Nine-Nine")
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "account_lifecycle=info,account_identity=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    println!("=== Account Lifecycle ===\n");

    let inbox = Inbox::default();
    let env = IdentityEnvironment::new(MockAccountStore::new(), MockCredentialStore::new(), inbox.clone());
    let service = IdentityService::new(load_config(), env);
    let login = service.authenticator();

    println!(">>> Register baracuda");
    let jake = service
        .register(&Registration {
            email: "jake.peralta@b99.com".to_string(),
            username: "baracuda".to_string(),
            secret: "rosa1234".to_string(),
            first_name: "Jake".to_string(),
            last_name: "Peralta".to_string(),
        })
        .await?;

    match login.resolve("baracuda", "rosa1234").await {
        Err(IdentityError::AuthFailure) => println!("Login before activation: refused"),
        other => anyhow::bail!("unexpected login result before activation: {other:?}"),
    }

    println!("\n>>> Follow the activation link");
    let jake = service.consume_activation(&inbox.click()?).await?;
    println!("Active: {}", jake.active);

    println!("\n>>> Change email");
    service.request_email_change(&jake, "peralta@nypd.gov").await?;
    let jake = service.consume_email_change(&inbox.click()?).await?;
    println!("Email is now {}", jake.email);

    println!("\n>>> Reset password");
    service.request_password_reset("PERALTA@nypd.gov").await?;
    let reset_token = inbox.click()?;
    service.consume_password_reset(&reset_token, "title-of-your-sex-tape").await?;
    match service.consume_password_reset(&reset_token, "again").await {
        Err(IdentityError::AccountNotFound) => println!("Reset link reused: refused"),
        other => anyhow::bail!("unexpected second reset result: {other:?}"),
    }

    println!("\n>>> Log in with the new email, any case");
    let resolved = login.resolve("Peralta@NYPD.gov", "title-of-your-sex-tape").await?;
    println!("Logged in as {} (id {})", resolved.username, resolved.id);

    println!("\n=== Lifecycle Complete ===");
    Ok(())
}

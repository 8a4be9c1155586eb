//! Seed accounts.
//!
//! | Account | Username   | Secret       | State                 |
//! |---------|------------|--------------|-----------------------|
//! | Jake    | `baracuda` | `rosa1234`   | active                |
//! | Amy     | `Aby`      | `philatelie` | active                |
//! | Norm    | `Norm`     | `1234`       | activation requested  |

use crate::harness::TestHarness;
use account_identity::providers::{AccountStore, CredentialStore};
use account_identity::state::NewAccount;
use account_identity::{Account, Result};

/// Jake's secret.
pub const JAKE_SECRET: &str = "rosa1234";
/// Amy's secret.
pub const AMY_SECRET: &str = "philatelie";
/// Norm's secret.
pub const NORM_SECRET: &str = "1234";

async fn create(
    harness: &TestHarness,
    email: &str,
    username: &str,
    (first_name, last_name): (&str, &str),
    secret: &str,
    active: bool,
) -> Result<Account> {
    let account = harness
        .accounts
        .insert(&NewAccount {
            email: email.to_string(),
            username: username.to_string(),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            active,
        })
        .await?;
    harness.credentials.set_secret(&account, secret).await?;
    Ok(account)
}

/// Active account `baracuda` / `jake.peralta@b99.com`.
///
/// # Errors
///
/// Propagates store errors.
pub async fn create_jake(harness: &TestHarness) -> Result<Account> {
    create(
        harness,
        "jake.peralta@b99.com",
        "baracuda",
        ("Jake", "Peralta"),
        JAKE_SECRET,
        true,
    )
    .await
}

/// Active account `Aby` / `amy.santiago@b99.com`.
///
/// # Errors
///
/// Propagates store errors.
pub async fn create_amy(harness: &TestHarness) -> Result<Account> {
    create(
        harness,
        "amy.santiago@b99.com",
        "Aby",
        ("Amy", "Santiago"),
        AMY_SECRET,
        true,
    )
    .await
}

/// Inactive account `Norm` / `norm.scully@b99.com` with an activation link
/// already sent.
///
/// # Errors
///
/// Propagates store and notifier errors.
pub async fn create_inactive_norm(harness: &TestHarness) -> Result<Account> {
    let norm = create(
        harness,
        "norm.scully@b99.com",
        "Norm",
        ("Norm", "Scully"),
        NORM_SECRET,
        false,
    )
    .await?;
    harness.service.request_activation(&norm).await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use account_identity::ActivationState;

    #[tokio::test]
    async fn test_seed_accounts() {
        let harness = TestHarness::new();
        let jake = create_jake(&harness).await.unwrap();
        let amy = create_amy(&harness).await.unwrap();
        let norm = create_inactive_norm(&harness).await.unwrap();

        assert!(jake.active && amy.active);
        assert_eq!(norm.activation_state(), ActivationState::ActivationRequested);
        assert_eq!(harness.notifier.count(), 1);
        assert_eq!(harness.accounts.len().unwrap(), 3);
    }
}

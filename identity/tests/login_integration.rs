//! Integration tests for login resolution.

use account_identity::IdentityError;
use account_identity_testing::{TestHarness, fixtures};

#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn test_login_by_username_or_email() {
    let harness = TestHarness::new();
    let jake = fixtures::create_jake(&harness).await.unwrap();
    let amy = fixtures::create_amy(&harness).await.unwrap();
    let login = harness.authenticator();

    for identifier in ["baracuda", "Baracuda", "jake.peralta@b99.com", "Jake.Peralta@B99.com"] {
        let resolved = login.resolve(identifier, fixtures::JAKE_SECRET).await.unwrap();
        assert_eq!(resolved.id, jake.id, "identifier {identifier}");
    }

    for identifier in ["Aby", "aby", "AMY.SANTIAGO@B99.COM"] {
        let resolved = login.resolve(identifier, fixtures::AMY_SECRET).await.unwrap();
        assert_eq!(resolved.id, amy.id, "identifier {identifier}");
    }
}

#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn test_secret_is_case_sensitive() {
    let harness = TestHarness::new();
    fixtures::create_amy(&harness).await.unwrap();

    assert_eq!(
        harness.authenticator().resolve("Aby", "PHILATELIE").await,
        Err(IdentityError::AuthFailure)
    );
}

#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn test_secret_belongs_to_matched_account() {
    let harness = TestHarness::new();
    fixtures::create_jake(&harness).await.unwrap();
    fixtures::create_amy(&harness).await.unwrap();

    assert_eq!(
        harness.authenticator().resolve("baracuda", fixtures::AMY_SECRET).await,
        Err(IdentityError::AuthFailure)
    );
}

#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn test_inactive_login_refused_by_default() {
    let harness = TestHarness::new();
    fixtures::create_inactive_norm(&harness).await.unwrap();

    assert_eq!(
        harness.authenticator().resolve("Norm", fixtures::NORM_SECRET).await,
        Err(IdentityError::AuthFailure)
    );
}

#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn test_inactive_login_when_enabled() {
    let harness = TestHarness::builder().with_inactive_login(true).build();
    let norm = fixtures::create_inactive_norm(&harness).await.unwrap();

    let resolved = harness
        .authenticator()
        .resolve("norm", fixtures::NORM_SECRET)
        .await
        .unwrap();
    assert_eq!(resolved.id, norm.id);
    assert!(!resolved.active);
}

#[tokio::test]
async fn test_empty_identifier() {
    let harness = TestHarness::new();

    assert_eq!(
        harness.authenticator().resolve("", "").await,
        Err(IdentityError::AuthFailure)
    );
}

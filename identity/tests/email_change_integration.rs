//! Integration tests for the email change flow.

use account_identity::providers::{AccountPatch, AccountStore, NotificationKind, Precondition};
use account_identity::IdentityError;
use account_identity_testing::{TestHarness, fixtures, init_tracing};
use chrono::Duration;

#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn test_email_change_flow_complete_happy_path() {
    init_tracing();
    let harness = TestHarness::new();
    let jake = fixtures::create_jake(&harness).await.unwrap();

    // Request
    let pending = harness
        .service
        .request_email_change(&jake, "jake@nypd.gov")
        .await
        .unwrap();
    assert_eq!(pending.email, "jake.peralta@b99.com");
    assert_eq!(pending.pending_email.as_deref(), Some("jake@nypd.gov"));

    let sent = harness.notifier.last().unwrap();
    assert_eq!(sent.kind, NotificationKind::EmailChange);
    // The link goes to the address the account holds today
    assert_eq!(sent.to, "jake.peralta@b99.com");
    assert!(sent.subject.contains("Brooklyn 99"));

    // Old address still logs in until the link is followed
    let login = harness.authenticator();
    login
        .resolve("jake.peralta@b99.com", fixtures::JAKE_SECRET)
        .await
        .unwrap();

    // Consume
    let token = harness.last_token().unwrap();
    let changed = harness.service.consume_email_change(&token).await.unwrap();
    assert_eq!(changed.email, "jake@nypd.gov");
    assert!(!changed.has_pending_email());

    assert_eq!(
        login.resolve("jake.peralta@b99.com", fixtures::JAKE_SECRET).await,
        Err(IdentityError::AuthFailure)
    );
    assert_eq!(
        login.resolve("JAKE@nypd.gov", fixtures::JAKE_SECRET).await.unwrap().id,
        jake.id
    );
}

#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn test_second_request_supersedes_first() {
    let harness = TestHarness::new();
    let jake = fixtures::create_jake(&harness).await.unwrap();

    harness.service.request_email_change(&jake, "first@nypd.gov").await.unwrap();
    let first = harness.last_token().unwrap();
    harness.service.request_email_change(&jake, "second@nypd.gov").await.unwrap();
    let second = harness.last_token().unwrap();

    assert_eq!(
        harness.service.consume_email_change(&first).await,
        Err(IdentityError::StaleToken)
    );
    assert_eq!(
        harness.service.consume_email_change(&second).await.unwrap().email,
        "second@nypd.gov"
    );
}

#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn test_candidate_claimed_before_consumption() {
    let harness = TestHarness::new();
    let jake = fixtures::create_jake(&harness).await.unwrap();
    let amy = fixtures::create_amy(&harness).await.unwrap();

    harness.service.request_email_change(&jake, "detective@nypd.gov").await.unwrap();
    let token = harness.last_token().unwrap();

    // Amy takes the address first
    harness.service.request_email_change(&amy, "Detective@NYPD.gov").await.unwrap();
    let amy_token = harness.last_token().unwrap();
    harness.service.consume_email_change(&amy_token).await.unwrap();

    assert_eq!(
        harness.service.consume_email_change(&token).await,
        Err(IdentityError::EmailTaken)
    );

    let jake = harness.accounts.get_by_id(jake.id).await.unwrap();
    assert_eq!(jake.email, "jake.peralta@b99.com");
    assert!(jake.pending_email.is_none());
}

#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn test_request_for_address_held_by_other_account() {
    let harness = TestHarness::new();
    let jake = fixtures::create_jake(&harness).await.unwrap();
    fixtures::create_amy(&harness).await.unwrap();

    assert_eq!(
        harness
            .service
            .request_email_change(&jake, "amy.santiago@b99.com")
            .await,
        Err(IdentityError::EmailTaken)
    );
    assert_eq!(harness.notifier.count(), 0);
    assert!(
        harness
            .accounts
            .get_by_id(jake.id)
            .await
            .unwrap()
            .pending_email
            .is_none()
    );
}

#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn test_email_changed_elsewhere_makes_token_stale() {
    let harness = TestHarness::new();
    let jake = fixtures::create_jake(&harness).await.unwrap();

    harness.service.request_email_change(&jake, "jake@nypd.gov").await.unwrap();
    let token = harness.last_token().unwrap();

    let patch = AccountPatch {
        email: Some("peralta@b99.com".to_string()),
        ..AccountPatch::default()
    };
    harness
        .accounts
        .update_if(jake.id, &Precondition::none(), &patch)
        .await
        .unwrap();

    assert_eq!(
        harness.service.consume_email_change(&token).await,
        Err(IdentityError::StaleToken)
    );
}

#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn test_deleted_account() {
    let harness = TestHarness::new();
    let jake = fixtures::create_jake(&harness).await.unwrap();

    harness.service.request_email_change(&jake, "jake@nypd.gov").await.unwrap();
    let token = harness.last_token().unwrap();
    harness.accounts.remove(jake.id).unwrap();

    assert_eq!(
        harness.service.consume_email_change(&token).await,
        Err(IdentityError::AccountNotFound)
    );
}

#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn test_expired_email_change_link() {
    let harness = TestHarness::builder()
        .with_token_ttl(Duration::minutes(30))
        .build();
    let jake = fixtures::create_jake(&harness).await.unwrap();

    harness.service.request_email_change(&jake, "jake@nypd.gov").await.unwrap();
    let token = harness.last_token().unwrap();
    harness.clock.advance(Duration::minutes(31));

    assert_eq!(
        harness.service.consume_email_change(&token).await,
        Err(IdentityError::TokenExpired)
    );
}

#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn test_change_case_of_own_address() {
    let harness = TestHarness::new();
    let jake = fixtures::create_jake(&harness).await.unwrap();

    harness
        .service
        .request_email_change(&jake, "Jake.Peralta@b99.com")
        .await
        .unwrap();
    let token = harness.last_token().unwrap();

    assert_eq!(
        harness.service.consume_email_change(&token).await.unwrap().email,
        "Jake.Peralta@b99.com"
    );
}

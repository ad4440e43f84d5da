mod common;

use std::sync::Arc;

use assert_matches::assert_matches;
use authgate_auth::ports::{UserDirectory, VerificationTokenStore};
use authgate_auth::{PasswordReset, TokenPurpose, VerificationTokenManager};
use authgate_core::error::CoreError;
use authgate_core::types::DbId;
use authgate_db::models::verification_token::{CreateVerificationToken, VerificationPurpose};
use chrono::{Duration, Utc};

use common::{DownMailer, Harness, PlainHasher};

fn reset(token: &str, password: &str, confirm: &str) -> PasswordReset {
    PasswordReset {
        token: token.into(),
        password: password.into(),
        confirm_password: confirm.into(),
    }
}

// ---------------------------------------------------------------------------
// Email verification
// ---------------------------------------------------------------------------

#[tokio::test]
async fn verify_email_round_trip_marks_user_and_consumes_token() {
    let h = Harness::new();
    let alice = h.seed_user("alice", "Secret123!").await;

    h.verification.send_verify_email("alice@example.com").await.unwrap();

    let mail = h.mailer.last().await.unwrap();
    assert_eq!(mail.kind, "verify_email");
    assert_eq!(mail.address, "alice@example.com");
    assert_eq!(
        h.signer.validate(TokenPurpose::EmailVerify, &mail.token),
        Some("alice@example.com".to_string())
    );

    h.verification.verify_email(&mail.token).await.unwrap();

    assert!(h.users.get(alice.id).await.unwrap().is_verified);
    assert!(h.tokens.all().await.is_empty());

    assert_matches!(
        h.verification.verify_email(&mail.token).await,
        Err(CoreError::NotFound { .. })
    );
}

#[tokio::test]
async fn already_verified_user_gets_conflict_and_no_token() {
    let h = Harness::new();
    let alice = h.seed_user("alice", "Secret123!").await;
    h.users.update_verified(alice.id).await.unwrap();

    let result = h.verification.send_verify_email("alice@example.com").await;

    assert_matches!(result, Err(CoreError::Conflict(msg)) if msg == "Email already verified");
    assert_eq!(h.tokens.write_count(), 0);
    assert_eq!(h.mailer.count().await, 0);
}

#[tokio::test]
async fn reissuing_replaces_the_previous_token() {
    let h = Harness::new();
    h.seed_user("alice", "Secret123!").await;

    h.verification.send_verify_email("alice@example.com").await.unwrap();
    let first = h.mailer.last().await.unwrap();
    h.verification.send_verify_email("alice@example.com").await.unwrap();
    let second = h.mailer.last().await.unwrap();

    assert_ne!(first.token, second.token);
    let stored = h.tokens.all().await;
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].token, second.token);

    assert_matches!(
        h.verification.verify_email(&first.token).await,
        Err(CoreError::NotFound { .. })
    );
    h.verification.verify_email(&second.token).await.unwrap();
}

#[tokio::test]
async fn send_verify_email_validates_address() {
    let h = Harness::new();

    assert_matches!(
        h.verification.send_verify_email("  ").await,
        Err(CoreError::InvalidInput(_))
    );
    assert_matches!(
        h.verification.send_verify_email("ghost@example.com").await,
        Err(CoreError::NotFound { entity: "User" })
    );
}

#[tokio::test]
async fn lapsed_stored_record_is_expired_even_with_valid_signature() {
    let h = Harness::new();
    h.seed_user("alice", "Secret123!").await;
    h.verification.send_verify_email("alice@example.com").await.unwrap();
    let record = h.tokens.all().await.remove(0);
    h.tokens
        .set_expires_at(record.id, Utc::now() - Duration::minutes(1))
        .await;

    let result = h.verification.verify_email(&record.token).await;

    assert_matches!(result, Err(CoreError::Expired(_)));
    assert_eq!(h.tokens.all().await.len(), 1);
}

#[tokio::test]
async fn forged_token_is_not_found_and_bad_signature_is_expired() {
    let h = Harness::new();
    let alice = h.seed_user("alice", "Secret123!").await;

    assert_matches!(
        h.verification.verify_email("not-a-token").await,
        Err(CoreError::NotFound { .. })
    );

    // A record whose stored value was signed with the wrong purpose's key.
    let wrong_key = h
        .signer
        .issue_default(TokenPurpose::ResetPassword, &alice.email)
        .unwrap();
    h.tokens
        .insert(&CreateVerificationToken {
            user_id: alice.id,
            purpose: VerificationPurpose::EmailVerify,
            email: alice.email.clone(),
            token: wrong_key.token.clone(),
            expires_at: wrong_key.expires_at,
        })
        .await
        .unwrap();

    assert_matches!(
        h.verification.verify_email(&wrong_key.token).await,
        Err(CoreError::Expired(_))
    );
}

// ---------------------------------------------------------------------------
// Password reset
// ---------------------------------------------------------------------------

#[tokio::test]
async fn reset_password_replaces_hash_and_allows_login() {
    let h = Harness::new();
    let alice = h.seed_user("alice", "Secret123!").await;
    h.lifecycle.login("alice", "Secret123!").await.unwrap();

    h.verification.send_reset_password(alice.id).await.unwrap();
    let mail = h.mailer.last().await.unwrap();
    assert_eq!(mail.kind, "reset_password");

    h.verification
        .reset_password(&reset(&mail.token, "NewSecret456!", "NewSecret456!"))
        .await
        .unwrap();

    assert!(h.tokens.all().await.is_empty());
    assert_matches!(
        h.lifecycle.login("alice", "Secret123!").await,
        Err(CoreError::InvalidCredentials)
    );
    h.lifecycle.login("alice", "NewSecret456!").await.unwrap();
}

#[tokio::test]
async fn reset_password_rejects_bad_input_before_lookup() {
    let h = Harness::new();

    assert_matches!(
        h.verification.reset_password(&reset("", "NewSecret456!", "NewSecret456!")).await,
        Err(CoreError::InvalidInput(_))
    );
    assert_matches!(
        h.verification.reset_password(&reset("t", "NewSecret456!", "Different456!")).await,
        Err(CoreError::InvalidInput(msg)) if msg == "Passwords do not match"
    );
    assert_matches!(
        h.verification.reset_password(&reset("t", "short", "short")).await,
        Err(CoreError::InvalidInput(_))
    );
    assert_matches!(
        h.verification.reset_password(&reset("t", "NewSecret456!", "NewSecret456!")).await,
        Err(CoreError::NotFound { .. })
    );
}

#[tokio::test]
async fn reset_for_unknown_user_is_not_found() {
    let h = Harness::new();

    let result = h.verification.send_reset_password(DbId::new_v4()).await;

    assert_matches!(result, Err(CoreError::NotFound { entity: "User" }));
    assert_eq!(h.tokens.write_count(), 0);
}

#[tokio::test]
async fn reset_token_cannot_verify_email() {
    let h = Harness::new();
    let alice = h.seed_user("alice", "Secret123!").await;
    h.verification.send_reset_password(alice.id).await.unwrap();
    let mail = h.mailer.last().await.unwrap();

    assert_matches!(
        h.verification.verify_email(&mail.token).await,
        Err(CoreError::NotFound { .. })
    );
    assert!(!h.users.get(alice.id).await.unwrap().is_verified);
}

#[tokio::test]
async fn token_subject_must_match_record_owner() {
    let h = Harness::new();
    let alice = h.seed_user("alice", "Secret123!").await;
    let bob = h.seed_user("bob", "Secret123!").await;

    // Bob's record carries a token whose subject is Alice's address.
    let issued = h
        .signer
        .issue_default(TokenPurpose::ResetPassword, &alice.email)
        .unwrap();
    h.tokens
        .insert(&CreateVerificationToken {
            user_id: bob.id,
            purpose: VerificationPurpose::ResetPassword,
            email: bob.email.clone(),
            token: issued.token.clone(),
            expires_at: issued.expires_at,
        })
        .await
        .unwrap();

    let result = h
        .verification
        .reset_password(&reset(&issued.token, "NewSecret456!", "NewSecret456!"))
        .await;

    assert_matches!(result, Err(CoreError::InvalidInput(_)));
    assert_eq!(
        h.users.get(alice.id).await.unwrap().password_hash,
        alice.password_hash
    );
}

// ---------------------------------------------------------------------------
// Mail delivery failures
// ---------------------------------------------------------------------------

#[tokio::test]
async fn mail_failure_is_internal_and_keeps_the_issued_token() {
    let h = Harness::new();
    let alice = h.seed_user("alice", "Secret123!").await;
    let verification = VerificationTokenManager::new(
        h.users.clone(),
        h.tokens.clone(),
        Arc::new(PlainHasher),
        h.signer.clone(),
        Arc::new(DownMailer),
    );

    assert_matches!(
        verification.send_verify_email("alice@example.com").await,
        Err(CoreError::Internal(_))
    );
    let kept = h
        .tokens
        .find_by_user(alice.id, VerificationPurpose::EmailVerify)
        .await
        .unwrap();
    assert!(kept.is_some());

    assert_matches!(
        verification.send_reset_password(alice.id).await,
        Err(CoreError::Internal(_))
    );
    let kept = h
        .tokens
        .find_by_user(alice.id, VerificationPurpose::ResetPassword)
        .await
        .unwrap()
        .unwrap();
    h.verification
        .reset_password(&reset(&kept.token, "NewSecret456!", "NewSecret456!"))
        .await
        .unwrap();
}

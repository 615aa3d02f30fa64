//! End-to-end OTP flow over the in-memory stores and the mock provider

use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{Duration, Utc};
use tokio::time::Instant;

use otp_core::domain::entities::otp::{
    OtpRecord, MAX_ATTEMPTS_PER_WINDOW, OTP_VALIDITY_MINUTES,
};
use otp_core::domain::entities::user::User;
use otp_core::errors::{DomainError, OtpError};
use otp_core::repositories::{OtpRepository, UserRepository};
use otp_core::services::dispatch::EmailTemplate;
use otp_core::services::otp::{Environment, OtpPurpose, OtpService, OtpServiceConfig};
use otp_infra::email::MockEmailProvider;
use otp_infra::store::{InMemoryOtpStore, InMemoryUserStore};

type Service = OtpService<MockEmailProvider, InMemoryUserStore, InMemoryOtpStore>;

struct Harness {
    provider: Arc<MockEmailProvider>,
    users: Arc<InMemoryUserStore>,
    otps: Arc<InMemoryOtpStore>,
    service: Service,
    user: User,
}

async fn harness() -> Harness {
    let provider = Arc::new(MockEmailProvider::new());
    let users = Arc::new(InMemoryUserStore::new());
    let otps = Arc::new(InMemoryOtpStore::new());

    let user = users
        .create(User::new("jane@example.com".to_string(), "Jane".to_string()))
        .await
        .unwrap();

    let config = OtpServiceConfig {
        environment: Environment::Development,
        hash_cost: 4,
        ..OtpServiceConfig::default()
    };
    let service = OtpService::new(provider.clone(), users.clone(), otps.clone(), config);

    Harness {
        provider,
        users,
        otps,
        service,
        user,
    }
}

fn otp_error(err: DomainError) -> OtpError {
    match err {
        DomainError::Otp(inner) => inner,
        other => panic!("expected OtpError, got {:?}", other),
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn full_issuance_and_verification_flow() {
    let h = harness().await;

    let issued = h
        .service
        .request_otp("jane@example.com", OtpPurpose::AccountVerification)
        .await
        .unwrap();
    assert!(issued.message_id.starts_with("mock-"));

    let stored = h.otps.find_by_user(h.user.id).await.unwrap().unwrap();
    assert_eq!(stored.attempts, 1);
    assert_eq!(
        stored.expires_at,
        stored.created_at + Duration::minutes(OTP_VALIDITY_MINUTES)
    );
    // The plaintext never reaches the store
    let code = h.provider.last_code_to("jane@example.com").unwrap();
    assert_ne!(stored.code_hash, code);

    let verified = h
        .service
        .verify_otp("jane@example.com", &code)
        .await
        .unwrap();
    assert_eq!(verified.user_id, h.user.id);

    // Record consumed, user verified
    assert!(h.otps.find_by_user(h.user.id).await.unwrap().is_none());
    let user = h.users.find_by_id(h.user.id).await.unwrap().unwrap();
    assert!(user.is_email_verified);

    // The detached welcome email arrives shortly after
    let mut saw_welcome = false;
    for _ in 0..100 {
        if h.provider
            .sent_messages()
            .iter()
            .any(|m| m.template == EmailTemplate::Welcome)
        {
            saw_welcome = true;
            break;
        }
        tokio::time::sleep(StdDuration::from_millis(5)).await;
    }
    assert!(saw_welcome, "welcome email was not dispatched");

    // The consumed code cannot be replayed
    let err = h
        .service
        .verify_otp("jane@example.com", &code)
        .await
        .unwrap_err();
    assert!(matches!(otp_error(err), OtpError::NoActiveOtp));
}

#[tokio::test]
async fn immediate_reissue_is_throttled() {
    let h = harness().await;

    h.service
        .request_otp("jane@example.com", OtpPurpose::AccountVerification)
        .await
        .unwrap();

    let err = h
        .service
        .request_otp("jane@example.com", OtpPurpose::AccountVerification)
        .await
        .unwrap_err();

    match otp_error(err) {
        OtpError::CooldownActive { retry_after } => {
            assert!(retry_after <= Duration::seconds(60));
            assert!(retry_after > Duration::seconds(55));
        }
        other => panic!("expected CooldownActive, got {:?}", other),
    }
}

#[tokio::test(start_paused = true)]
async fn transient_provider_failures_are_retried() {
    let h = harness().await;
    h.provider.fail_next(2);

    let issued = h
        .service
        .request_otp("jane@example.com", OtpPurpose::AccountVerification)
        .await;

    assert!(issued.is_ok());
    assert_eq!(h.provider.send_count(), 3);
    assert_eq!(
        h.otps.find_by_user(h.user.id).await.unwrap().unwrap().attempts,
        1
    );
}

#[tokio::test(start_paused = true)]
async fn exhausted_retries_leave_no_state_behind() {
    let h = harness().await;
    h.provider.set_simulate_failure(true);

    let started = Instant::now();
    let err = h
        .service
        .request_otp("jane@example.com", OtpPurpose::AccountVerification)
        .await
        .unwrap_err();

    assert!(matches!(otp_error(err), OtpError::DeliveryFailed));
    assert_eq!(h.provider.send_count(), 3);
    // Two fixed 2s pauses between the three attempts
    assert!(started.elapsed() >= StdDuration::from_secs(4));
    // An unsent code is a free retry: nothing was committed
    assert!(h.otps.is_empty().await);

    // Recovery is immediate once the provider is back
    h.provider.set_simulate_failure(false);
    assert!(h
        .service
        .request_otp("jane@example.com", OtpPurpose::AccountVerification)
        .await
        .is_ok());
}

#[tokio::test]
async fn missing_template_short_circuits() {
    let h = harness().await;
    h.provider.unregister_template("password-reset-code");

    let err = h
        .service
        .request_otp("jane@example.com", OtpPurpose::PasswordReset)
        .await
        .unwrap_err();

    assert!(matches!(otp_error(err), OtpError::DeliveryFailed));
    // No send attempt was spent on the configuration error
    assert_eq!(h.provider.send_count(), 0);
}

#[tokio::test]
async fn window_cap_holds_until_reset() {
    let h = harness().await;

    // Six codes already issued this window; the current one is expired, so
    // the cooldown gate does not apply
    let now = Utc::now();
    let mut record = OtpRecord::new(h.user.id, "$2b$04$placeholder".to_string(), now);
    record.attempts = MAX_ATTEMPTS_PER_WINDOW;
    record.created_at = now - Duration::minutes(40);
    record.expires_at = record.created_at + Duration::minutes(OTP_VALIDITY_MINUTES);
    record.last_request_time = now - Duration::minutes(40);
    record.attempt_window_start = now - Duration::minutes(90);
    h.otps.create(record.clone()).await.unwrap();

    let err = h
        .service
        .request_otp("jane@example.com", OtpPurpose::AccountVerification)
        .await
        .unwrap_err();

    match otp_error(err) {
        OtpError::AttemptCapReached { limit, resets_at } => {
            assert_eq!(limit, MAX_ATTEMPTS_PER_WINDOW);
            assert_eq!(resets_at, record.window_resets_at());
        }
        other => panic!("expected AttemptCapReached, got {:?}", other),
    }
}

#[tokio::test]
async fn wrong_code_preserves_counters() {
    let h = harness().await;

    h.service
        .request_otp("jane@example.com", OtpPurpose::AccountVerification)
        .await
        .unwrap();
    let before = h.otps.find_by_user(h.user.id).await.unwrap().unwrap();

    let code = h.provider.last_code_to("jane@example.com").unwrap();
    let wrong = if code == "000000" { "111111" } else { "000000" };

    let err = h
        .service
        .verify_otp("jane@example.com", wrong)
        .await
        .unwrap_err();
    assert!(matches!(otp_error(err), OtpError::CodeMismatch));

    let after = h.otps.find_by_user(h.user.id).await.unwrap().unwrap();
    assert_eq!(after, before);
}

#[tokio::test]
async fn users_are_throttled_independently() {
    let h = harness().await;
    h.users
        .create(User::new("john@example.com".to_string(), "John".to_string()))
        .await
        .unwrap();

    h.service
        .request_otp("jane@example.com", OtpPurpose::AccountVerification)
        .await
        .unwrap();

    // Jane's cooldown does not slow John down
    assert!(h
        .service
        .request_otp("john@example.com", OtpPurpose::AccountVerification)
        .await
        .is_ok());
    assert_eq!(h.otps.len().await, 2);
}

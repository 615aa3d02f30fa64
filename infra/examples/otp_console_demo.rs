//! Console walkthrough of the OTP lifecycle over the in-memory stores
//!
//! Run with: cargo run -p otp_infra --example otp_console_demo

use std::error::Error;
use std::sync::Arc;

use otp_core::domain::entities::user::User;
use otp_core::repositories::UserRepository;
use otp_core::services::otp::{Environment, OtpPurpose, OtpService, OtpServiceConfig};
use otp_infra::email::MockEmailProvider;
use otp_infra::store::{InMemoryOtpStore, InMemoryUserStore};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let provider = Arc::new(MockEmailProvider::new());
    let users = Arc::new(InMemoryUserStore::new());
    let otps = Arc::new(InMemoryOtpStore::new());

    let user = users
        .create(User::new(
            "jane@example.com".to_string(),
            "Jane".to_string(),
        ))
        .await?;
    println!("Registered user {} <{}>", user.name, user.email);

    let config = OtpServiceConfig {
        environment: Environment::Development,
        ..OtpServiceConfig::default()
    };
    let service = OtpService::new(provider.clone(), users.clone(), otps, config);

    let issued = service
        .request_otp("jane@example.com", OtpPurpose::AccountVerification)
        .await?;
    println!(
        "Passcode issued: message_id={} expires_in={}",
        issued.message_id, issued.expires_in
    );

    // The development-mode echo stands in for reading the email
    let code = issued.debug_code.expect("development mode echoes the code");

    // A second request straight away runs into the cooldown gate
    match service
        .request_otp("jane@example.com", OtpPurpose::AccountVerification)
        .await
    {
        Err(err) => println!("Re-request rejected: {}", err),
        Ok(_) => println!("Re-request unexpectedly accepted"),
    }

    let verified = service.verify_otp("jane@example.com", &code).await?;
    println!("Verified user {}", verified.user_id);

    let user = users
        .find_by_id(verified.user_id)
        .await?
        .expect("user still exists");
    println!("Email verified flag: {}", user.is_email_verified);

    // Give the detached welcome email a moment to land
    tokio::time::sleep(std::time::Duration::from_millis(100)).await;

    Ok(())
}

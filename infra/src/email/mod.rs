//! Email provider implementations
//!
//! `ResendEmailProvider` talks to the real HTTP API; `MockEmailProvider`
//! records messages and prints passcodes to the console for development.

pub mod mock;
pub mod resend;

pub use mock::MockEmailProvider;
pub use resend::{ResendConfig, ResendEmailProvider};

//! Email dispatch with bounded retry
//!
//! The dispatch module normalizes every provider call into a
//! [`DispatchResult`] and drives a retry loop over it. Passcode emails use a
//! fixed inter-attempt delay; notification emails are single best-effort
//! sends.

mod email_utils;
mod mailer;
mod traits;
mod types;

pub use email_utils::{is_valid_email_format, mask_email, normalize_email};
pub use mailer::Mailer;
pub use traits::EmailProvider;
pub use types::{DispatchOutcome, DispatchResult, EmailMessage, EmailTemplate, RetryPolicy};

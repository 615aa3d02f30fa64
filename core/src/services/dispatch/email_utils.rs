//! Email address utility functions for passcode dispatch
//!
//! Provides address normalization, format validation, and masking for log
//! output.

use once_cell::sync::Lazy;
use regex::Regex;

/// Regular expression for a plausible email address
/// One '@', no whitespace, and a dotted domain part
static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap()
});

/// Normalize an email address for lookups and storage
///
/// Trims surrounding whitespace and lowercases the address so lookups are
/// case-insensitive.
///
/// # Arguments
///
/// * `email` - Email address as entered by the user
///
/// # Returns
///
/// * `String` - Normalized address
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Validates if an address looks like a deliverable email
///
/// # Arguments
///
/// * `email` - Email address to validate
///
/// # Returns
///
/// * `bool` - True if the address has a plausible shape, false otherwise
pub fn is_valid_email_format(email: &str) -> bool {
    EMAIL_REGEX.is_match(email)
}

/// Mask an email address for logging (keep the first character and domain)
///
/// # Arguments
///
/// * `email` - Email address to mask
///
/// # Returns
///
/// * `String` - Masked address
pub fn mask_email(email: &str) -> String {
    match email.split_once('@') {
        Some((local, domain)) => match local.chars().next() {
            Some(first) => format!("{}***@{}", first, domain),
            None => format!("***@{}", domain),
        },
        None => "***".to_string(),
    }
}

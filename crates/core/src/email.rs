//! Email normalization and format validation.
//!
//! A normalized email is trimmed and lower-cased; it is the uniqueness key
//! for directory entries in every store implementation.

use validator::ValidateEmail;

use crate::error::CoreError;

/// Trim surrounding whitespace and lower-case an email address.
pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Whether `email` has a valid address structure (`local@domain`).
pub fn is_valid_email(email: &str) -> bool {
    email.validate_email()
}

/// Normalize `raw` and reject it with [`CoreError::InvalidEmail`] when it is
/// not email-shaped.
pub fn parse_email(raw: &str) -> Result<String, CoreError> {
    let email = normalize_email(raw);
    if email.is_empty() || !is_valid_email(&email) {
        return Err(CoreError::InvalidEmail(raw.trim().to_string()));
    }
    Ok(email)
}

use std::{borrow::Cow, sync::LazyLock};

use regex::Regex;
use validator::ValidationError;

/// Regex for validating URL-friendly slugs (lowercase alphanumeric with hyphens).
/// Examples: "fund-i", "growth-2024"
pub static SLUG_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").unwrap());

/// Minimum password length accepted at setup and reset.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Validate a new account password.
///
/// Requires at least [`MIN_PASSWORD_LENGTH`] characters and at least one
/// uppercase letter, one lowercase letter and one digit.
pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    let failure = |code: &'static str, message: &'static str| {
        let mut err = ValidationError::new(code);
        err.message = Some(Cow::Borrowed(message));
        err
    };

    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(failure(
            "password_too_short",
            "Password must be at least 8 characters",
        ));
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        return Err(failure(
            "password_missing_uppercase",
            "Must contain at least one uppercase letter",
        ));
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        return Err(failure(
            "password_missing_lowercase",
            "Must contain at least one lowercase letter",
        ));
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(failure(
            "password_missing_digit",
            "Must contain at least one number",
        ));
    }
    Ok(())
}

/// Canonical form for email comparisons against the allow-list.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

//! Registration input validation.
//!
//! Field rules:
//! - given and family names: Latin letters (accented ones included) and spaces
//! - email: `local@domain.tld` syntax, at most 254 characters
//! - password: at least 8 characters with a letter, a digit and a symbol

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

/// Minimum password length, in characters.
pub const PASSWORD_MIN_LEN: usize = 8;

/// Maximum email length (RFC 5321 path limit).
pub const EMAIL_MAX_LEN: usize = 254;

/// Latin letters including U+00C0..U+017F, minus × (U+00D7) and ÷ (U+00F7).
static NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z\x{00C0}-\x{00D6}\x{00D8}-\x{00F6}\x{00F8}-\x{017F}\s]+$")
        .unwrap_or_else(|error| panic!("name regex failed to compile: {error}"))
});

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    let local = r"[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+(?:\.[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+)*";
    let label = r"[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?";
    let pattern = format!(r"^{local}@{label}(?:\.{label})*\.[A-Za-z]{{2,}}$");
    Regex::new(&pattern).unwrap_or_else(|error| panic!("email regex failed to compile: {error}"))
});

/// Why a registration field was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    Missing(&'static str),

    #[error("{0} must contain only letters")]
    InvalidName(&'static str),

    #[error("Invalid email address")]
    InvalidEmail,

    #[error("Password must be at least 8 characters with a letter, a digit and a special character")]
    WeakPassword,
}

/// Registration fields after validation. `email` is normalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub name: String,
    pub family_name: String,
    pub email: String,
    pub password: String,
}

/// Trim and lowercase an email. Stored emails are always in this form.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Validate a given or family name. `field` names the field in the error.
pub fn validate_name(field: &'static str, value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Missing(field));
    }
    if !NAME_RE.is_match(trimmed) {
        return Err(ValidationError::InvalidName(field));
    }
    Ok(trimmed.to_string())
}

/// Validate an email, returning its normalized form.
pub fn validate_email(email: &str) -> Result<String, ValidationError> {
    let normalized = normalize_email(email);
    if normalized.is_empty() {
        return Err(ValidationError::Missing("email"));
    }
    if normalized.len() > EMAIL_MAX_LEN || !EMAIL_RE.is_match(&normalized) {
        return Err(ValidationError::InvalidEmail);
    }
    Ok(normalized)
}

/// Check the password composition policy. The password is never trimmed.
pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    if password.is_empty() {
        return Err(ValidationError::Missing("password"));
    }
    let long_enough = password.chars().count() >= PASSWORD_MIN_LEN;
    let has_letter = password.chars().any(char::is_alphabetic);
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let has_symbol = password
        .chars()
        .any(|c| !c.is_alphanumeric() && c != '_' && !c.is_whitespace());
    if long_enough && has_letter && has_digit && has_symbol {
        Ok(())
    } else {
        Err(ValidationError::WeakPassword)
    }
}

/// Validate all four registration fields, stopping at the first failure.
pub fn validate_registration(
    name: &str,
    family_name: &str,
    email: &str,
    password: &str,
) -> Result<Registration, ValidationError> {
    let name = validate_name("name", name)?;
    let family_name = validate_name("familyName", family_name)?;
    let email = validate_email(email)?;
    validate_password(password)?;
    Ok(Registration {
        name,
        family_name,
        email,
        password: password.to_string(),
    })
}

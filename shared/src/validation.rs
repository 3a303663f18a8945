//! Input validation helpers
//!
//! Text length limits and the field checks shared by the request handlers.

use std::sync::LazyLock;

use regex::Regex;
use validator::ValidateEmail;

use crate::error::AppError;

// ── Text length limits ──────────────────────────────────────────────

/// Entity names: restaurant, menu item, cuisine
pub const MAX_NAME_LEN: usize = 200;

/// Descriptions, notes
pub const MAX_NOTE_LEN: usize = 500;

/// Short text: phone, opening hours
pub const MAX_SHORT_TEXT_LEN: usize = 100;

/// Email addresses (RFC 5321)
pub const MAX_EMAIL_LEN: usize = 254;

/// Addresses
pub const MAX_ADDRESS_LEN: usize = 500;

// ── Validation helpers ──────────────────────────────────────────────

/// Take a required field out of an optional payload slot, trimmed and non-empty.
pub fn require_text(value: Option<String>, field: &str, max_len: usize) -> Result<String, AppError> {
    let value = value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::required(field))?;
    validate_required_text(&value, field, max_len)?;
    Ok(value)
}

/// Validate that a required string is non-empty and within the length limit.
pub fn validate_required_text(value: &str, field: &str, max_len: usize) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::validation(format!("{field} must not be empty")));
    }
    if value.len() > max_len {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            value.len()
        )));
    }
    Ok(())
}

/// Validate that an optional string, if present, is within the length limit.
pub fn validate_optional_text(
    value: &Option<String>,
    field: &str,
    max_len: usize,
) -> Result<(), AppError> {
    if let Some(v) = value
        && v.len() > max_len
    {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            v.len()
        )));
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), AppError> {
    if email.len() > MAX_EMAIL_LEN || !email.validate_email() {
        return Err(AppError::validation("Invalid email format").with_detail("field", "email"));
    }
    Ok(())
}

/// `+? (? ddd )? sep? ddd sep? dddd[dd]` where sep is `-`, `.` or whitespace.
static PHONE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\+?\(?[0-9]{3}\)?[-\s.]?[0-9]{3}[-\s.]?[0-9]{4,6}$").expect("valid phone regex")
});

pub fn validate_phone(phone: &str) -> Result<(), AppError> {
    if !PHONE_RE.is_match(phone) {
        return Err(
            AppError::validation("Invalid phone number format").with_detail("field", "phone"),
        );
    }
    Ok(())
}

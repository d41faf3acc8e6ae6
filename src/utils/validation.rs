//! Input validation for registration and free-text fields

use std::sync::LazyLock;
use regex::Regex;
use crate::storage::codec;
use crate::utils::errors::{Result, TrekError};

static USERNAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9_]{3,20}$").expect("valid username pattern"));
static NAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z ]{3,50}$").expect("valid name pattern"));
static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9_+&*-]+(?:\.[a-zA-Z0-9_+&*-]+)*@(?:[a-zA-Z0-9-]+\.)+[a-zA-Z]{2,7}$")
        .expect("valid email pattern")
});
static PHONE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{7,15}$").expect("valid phone pattern"));

const PASSWORD_SPECIALS: &str = "@#$%^&+=";
pub const MAX_EXPERIENCE_YEARS: u32 = 50;

pub fn validate_username(username: &str) -> Result<()> {
    if username.is_empty() {
        return Err(TrekError::invalid("username", "Username is required"));
    }
    if !USERNAME_PATTERN.is_match(username) {
        return Err(TrekError::invalid("username", "3-20 chars (letters, numbers, _)"));
    }
    Ok(())
}

/// At least eight characters with upper, lower, digit and one of `@#$%^&+=`, no whitespace
pub fn validate_password(password: &str) -> Result<()> {
    if password.is_empty() {
        return Err(TrekError::invalid("password", "Password is required"));
    }
    let strong = password.chars().count() >= 8
        && password.chars().any(|c| c.is_ascii_digit())
        && password.chars().any(|c| c.is_ascii_lowercase())
        && password.chars().any(|c| c.is_ascii_uppercase())
        && password.chars().any(|c| PASSWORD_SPECIALS.contains(c))
        && !password.chars().any(char::is_whitespace);
    if !strong {
        return Err(TrekError::invalid(
            "password",
            "Needs uppercase, lowercase, number & special char",
        ));
    }
    validate_free_text("password", password)
}

pub fn validate_full_name(name: &str) -> Result<()> {
    if !NAME_PATTERN.is_match(name) {
        return Err(TrekError::invalid("full_name", "3-50 alphabetic characters"));
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<()> {
    if !EMAIL_PATTERN.is_match(email) {
        return Err(TrekError::invalid("email", "Invalid email format"));
    }
    Ok(())
}

pub fn validate_phone(phone: &str) -> Result<()> {
    if !PHONE_PATTERN.is_match(phone) {
        return Err(TrekError::invalid("phone", "7-15 digits only"));
    }
    Ok(())
}

pub fn validate_nationality(nationality: &str) -> Result<()> {
    if !NAME_PATTERN.is_match(nationality) {
        return Err(TrekError::invalid("nationality", "3-50 alphabetic characters"));
    }
    Ok(())
}

pub fn validate_languages(languages: &[String]) -> Result<()> {
    if languages.is_empty() {
        return Err(TrekError::invalid("languages", "At least one language required"));
    }
    for language in languages {
        validate_list_item("languages", language)?;
    }
    Ok(())
}

pub fn validate_experience(years: u32) -> Result<()> {
    if years > MAX_EXPERIENCE_YEARS {
        return Err(TrekError::invalid("experience_years", "Must be 0-50 years"));
    }
    Ok(())
}

/// Text that must survive a round trip through the data files
pub fn validate_free_text(field: &str, text: &str) -> Result<()> {
    match codec::field_problem(text) {
        Some(problem) => Err(TrekError::invalid(field, format!("cannot be stored: {}", problem))),
        None => Ok(()),
    }
}

/// Entries of comma-joined list fields
pub fn validate_list_item(field: &str, item: &str) -> Result<()> {
    if item.trim().is_empty() {
        return Err(TrekError::invalid(field, "entries must not be blank"));
    }
    if item.contains(',') {
        return Err(TrekError::invalid(field, "entries must not contain ','"));
    }
    validate_free_text(field, item)
}

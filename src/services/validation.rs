//! Field rules for the forms accepted by the API.

use std::sync::LazyLock;

use regex::Regex;

use crate::errors::ServiceError;

pub const TITLE_MAX: usize = 256;
pub const USERNAME_MAX: usize = 150;
pub const SLUG_MAX: usize = 50;
pub const EMAIL_MAX: usize = 254;
pub const PASSWORD_MIN: usize = 8;

static USERNAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\w.@+-]+$").expect("username regex"));
static SLUG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[-a-zA-Z0-9_]+$").expect("slug regex"));
static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^[A-Z0-9._%+-]+@[A-Z0-9.-]+\.[A-Z]{2,}$").expect("email regex")
});

fn invalid(message: impl Into<String>) -> ServiceError {
    ServiceError::Validation(message.into())
}

pub fn required<'a>(field: &str, value: &'a str) -> Result<&'a str, ServiceError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(invalid(format!("{} is required", field)));
    }
    Ok(trimmed)
}

pub fn max_chars(field: &str, value: &str, max: usize) -> Result<(), ServiceError> {
    if value.chars().count() > max {
        return Err(invalid(format!("{} must be at most {} characters", field, max)));
    }
    Ok(())
}

pub fn title(value: &str) -> Result<String, ServiceError> {
    let value = required("title", value)?;
    max_chars("title", value, TITLE_MAX)?;
    Ok(value.to_string())
}

pub fn username(value: &str) -> Result<String, ServiceError> {
    let value = required("username", value)?;
    max_chars("username", value, USERNAME_MAX)?;
    if !USERNAME_RE.is_match(value) {
        return Err(invalid(
            "username may contain only letters, digits and @/./+/-/_ characters",
        ));
    }
    Ok(value.to_string())
}

pub fn slug(value: &str) -> Result<String, ServiceError> {
    let value = required("slug", value)?;
    max_chars("slug", value, SLUG_MAX)?;
    if !SLUG_RE.is_match(value) {
        return Err(invalid(
            "slug may contain only latin letters, digits, hyphens and underscores",
        ));
    }
    Ok(value.to_string())
}

/// Empty is allowed; the email field is optional.
pub fn email(value: &str) -> Result<String, ServiceError> {
    let value = value.trim();
    max_chars("email", value, EMAIL_MAX)?;
    if !value.is_empty() && !EMAIL_RE.is_match(value) {
        return Err(invalid("enter a valid email address"));
    }
    Ok(value.to_string())
}

pub fn new_password(username: &str, password1: &str, password2: &str) -> Result<(), ServiceError> {
    if password1 != password2 {
        return Err(invalid("the two password fields didn't match"));
    }
    if password1.chars().count() < PASSWORD_MIN {
        return Err(invalid(format!(
            "password must contain at least {} characters",
            PASSWORD_MIN
        )));
    }
    if password1.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid("password can't be entirely numeric"));
    }
    if password1.eq_ignore_ascii_case(username) {
        return Err(invalid("password is too similar to the username"));
    }
    Ok(())
}

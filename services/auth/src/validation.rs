//! Input validation utilities
//!
//! Each check returns a message; request validators collect every failing
//! message and report them together as one `BadRequest`.

use regex::Regex;
use std::sync::OnceLock;

use crate::error::{AuthError, AuthResult};
use crate::models::{LoginRequest, RegisterRequest, UpdateUserRequest};

const MAX_NAME_LENGTH: usize = 100;

/// Validate email
pub fn validate_email(email: &str) -> Result<(), String> {
    if email.is_empty() {
        return Err("Email is required".to_string());
    }

    if email.len() > 254 {
        return Err("Email must be at most 254 characters long".to_string());
    }

    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = EMAIL_REGEX.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
            .expect("Failed to compile email regex")
    });

    if !regex.is_match(email) {
        return Err("Invalid email format".to_string());
    }

    Ok(())
}

/// Validate password
pub fn validate_password(password: &str) -> Result<(), String> {
    if password.is_empty() {
        return Err("Password is required".to_string());
    }

    if password.chars().count() < 8 {
        return Err("Password must be at least 8 characters long".to_string());
    }

    if password.chars().count() > 128 {
        return Err("Password must be at most 128 characters long".to_string());
    }

    Ok(())
}

/// Validate an optional display name
pub fn validate_name(label: &str, name: Option<&str>) -> Result<(), String> {
    match name {
        Some(name) if name.chars().count() > MAX_NAME_LENGTH => Err(format!(
            "{} must be at most {} characters long",
            label, MAX_NAME_LENGTH
        )),
        _ => Ok(()),
    }
}

fn collect(results: impl IntoIterator<Item = Result<(), String>>) -> AuthResult<()> {
    let messages: Vec<String> = results.into_iter().filter_map(Result::err).collect();
    if messages.is_empty() {
        Ok(())
    } else {
        Err(AuthError::BadRequest(messages.join(", ")))
    }
}

pub fn validate_registration(request: &RegisterRequest) -> AuthResult<()> {
    collect([
        validate_email(&request.email),
        validate_password(&request.password),
        validate_name("First name", request.first_name.as_deref()),
        validate_name("Last name", request.last_name.as_deref()),
    ])
}

pub fn validate_login(request: &LoginRequest) -> AuthResult<()> {
    collect([
        validate_email(&request.email),
        if request.password.is_empty() {
            Err("Password is required".to_string())
        } else {
            Ok(())
        },
    ])
}

pub fn validate_user_update(request: &UpdateUserRequest) -> AuthResult<()> {
    collect([
        request.email.as_deref().map_or(Ok(()), validate_email),
        request.password.as_deref().map_or(Ok(()), validate_password),
        validate_name("First name", request.first_name.as_deref()),
        validate_name("Last name", request.last_name.as_deref()),
    ])
}

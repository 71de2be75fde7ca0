// ABOUTME: User models for the recipe author directory
// ABOUTME: Persisted User record and the validated NewUser registration draft
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::{lengths, reserved};
use crate::errors::{AppError, AppResult};

/// Registered user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Row id
    pub id: i64,
    /// Login email, unique
    pub email: String,
    /// Public handle, unique
    pub username: String,
    /// Given name
    pub first_name: String,
    /// Family name
    pub last_name: String,
    /// Bcrypt password hash
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Stored avatar reference, relative to the media root
    pub avatar: Option<String>,
    /// Registration time
    pub created_at: DateTime<Utc>,
}

/// Registration input, validated before hashing and insertion
#[derive(Debug, Clone)]
pub struct NewUser {
    /// Login email
    pub email: String,
    /// Public handle
    pub username: String,
    /// Given name
    pub first_name: String,
    /// Family name
    pub last_name: String,
    /// Plain-text password
    pub password: String,
}

impl NewUser {
    /// Check field formats and lengths
    ///
    /// # Errors
    ///
    /// Returns a validation error naming the first offending field
    pub fn validate(&self) -> AppResult<()> {
        validate_email(&self.email)?;
        validate_username(&self.username)?;
        require_len("first_name", &self.first_name, lengths::USER_NAME)?;
        require_len("last_name", &self.last_name, lengths::USER_NAME)?;
        validate_password(&self.password)
    }
}

/// Minimal structural email check: one `@` with non-empty local and domain parts
///
/// # Errors
///
/// Returns a validation error if the address is malformed or too long
pub fn validate_email(email: &str) -> AppResult<()> {
    require_len("email", email, lengths::EMAIL)?;
    let well_formed = email
        .split_once('@')
        .is_some_and(|(local, domain)| {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !domain.contains('@')
        })
        && !email.chars().any(char::is_whitespace);
    if well_formed {
        Ok(())
    } else {
        Err(AppError::invalid_input("Enter a valid email address").with_field("email"))
    }
}

/// Usernames match `^[\w.@+-]+$` and must not shadow a fixed route
///
/// # Errors
///
/// Returns a validation error for disallowed characters or reserved names
pub fn validate_username(username: &str) -> AppResult<()> {
    require_len("username", username, lengths::USER_NAME)?;
    let allowed = username
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '_' | '.' | '@' | '+' | '-'));
    if !allowed {
        return Err(AppError::invalid_input(
            "Username may contain only letters, digits and @/./+/-/_",
        )
        .with_field("username"));
    }
    if reserved::USERNAMES.contains(&username.to_lowercase().as_str()) {
        return Err(
            AppError::invalid_input(format!("Username '{username}' is reserved"))
                .with_field("username"),
        );
    }
    Ok(())
}

/// Passwords must be non-empty and bounded
///
/// # Errors
///
/// Returns a validation error for empty or overlong passwords
pub fn validate_password(password: &str) -> AppResult<()> {
    require_len("password", password, lengths::PASSWORD)
}

fn require_len(field: &str, value: &str, max: usize) -> AppResult<()> {
    if value.trim().is_empty() {
        return Err(AppError::missing_field(field));
    }
    if value.chars().count() > max {
        return Err(
            AppError::invalid_input(format!("{field} must be at most {max} characters"))
                .with_field(field),
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> NewUser {
        NewUser {
            email: "cook@example.com".into(),
            username: "cook.42".into(),
            first_name: "Ada".into(),
            last_name: "Cook".into(),
            password: "s3cret-pass".into(),
        }
    }

    #[test]
    fn test_valid_registration() {
        assert!(draft().validate().is_ok());
    }

    #[test]
    fn test_reserved_username_rejected() {
        let mut user = draft();
        user.username = "me".into();
        assert!(user.validate().is_err());
    }

    #[test]
    fn test_username_charset() {
        assert!(validate_username("повар_1").is_ok());
        assert!(validate_username("bad name").is_err());
        assert!(validate_username("semi;colon").is_err());
    }

    #[test]
    fn test_email_shapes() {
        assert!(validate_email("a@b.co").is_ok());
        assert!(validate_email("no-at-sign").is_err());
        assert!(validate_email("a@nodot").is_err());
        assert!(validate_email("a b@c.de").is_err());
    }

    #[test]
    fn test_missing_names_rejected() {
        let mut user = draft();
        user.first_name = "  ".into();
        let err = user.validate().unwrap_err();
        assert!(err.message.contains("first_name"));
    }
}

//! Input validation functions
//!
//! Presence and shape checks applied by the transport layer before a request
//! reaches the authentication core.

use thiserror::Error;
use validator::ValidateEmail;

pub const MAX_EMAIL_LEN: usize = 255;
pub const MAX_USERNAME_LEN: usize = 64;
/// Upper bound on password bytes, keeps the hasher's input bounded
pub const MAX_PASSWORD_LEN: usize = 128;

/// Validation failure for a single field
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Validate email presence and format
pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    if email.trim().is_empty() {
        return Err(ValidationError::new("email", "cannot be empty"));
    }
    if email.len() > MAX_EMAIL_LEN {
        return Err(ValidationError::new("email", "too long"));
    }
    if !email.validate_email() {
        return Err(ValidationError::new("email", "invalid format"));
    }
    Ok(())
}

/// Validate username presence
pub fn validate_username(username: &str) -> Result<(), ValidationError> {
    if username.trim().is_empty() {
        return Err(ValidationError::new("username", "cannot be empty"));
    }
    if username.chars().count() > MAX_USERNAME_LEN {
        return Err(ValidationError::new("username", "too long"));
    }
    Ok(())
}

/// Validate password presence
pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    if password.is_empty() {
        return Err(ValidationError::new("password", "cannot be empty"));
    }
    if password.len() > MAX_PASSWORD_LEN {
        return Err(ValidationError::new("password", "too long"));
    }
    Ok(())
}

/// Validate that a bearer token was supplied
pub fn validate_token(field: &'static str, token: &str) -> Result<(), ValidationError> {
    if token.trim().is_empty() {
        return Err(ValidationError::new(field, "cannot be empty"));
    }
    Ok(())
}

/// Validate a store-assigned user ID
pub fn validate_user_id(user_id: i64) -> Result<(), ValidationError> {
    if user_id <= 0 {
        return Err(ValidationError::new("user_id", "must be positive"));
    }
    Ok(())
}

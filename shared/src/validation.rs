//! Client-side checks that run before any write leaves the core.

use chrono::NaiveDate;
use secrecy::ExposeSecret;
use thiserror::Error;

use crate::event::Password;
use crate::model::Session;
use crate::{AppError, ErrorKind, BOOTSTRAP_ADMIN, MIN_PASSWORD_LENGTH};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please enter a username")]
    EmptyUsername,

    #[error("Password must be at least 6 characters")]
    PasswordTooShort,

    #[error("New passwords do not match")]
    PasswordMismatch,

    #[error("Please enter your current password")]
    MissingCurrentPassword,

    #[error("The main admin account cannot be deleted")]
    CannotDeleteBootstrap,

    #[error("You cannot delete your own account")]
    CannotDeleteSelf,

    #[error("Invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("Start date {from} is after end date {to}")]
    InvertedDateRange { from: NaiveDate, to: NaiveDate },

    #[error("Page size must be a positive number, got {0}")]
    InvalidPageSize(usize),

    #[error("Unknown status '{0}'")]
    UnknownStatus(String),

    #[error("Please enter a complaint ID")]
    EmptyComplaintId,

    #[error("Please describe the complaint")]
    EmptyDescription,
}

impl From<ValidationError> for AppError {
    fn from(e: ValidationError) -> Self {
        AppError::new(ErrorKind::Validation, e.to_string())
    }
}

/// Trims the username and checks both fields of the add-admin form.
pub fn validate_new_admin(username: &str, password: &Password) -> Result<String, ValidationError> {
    let username = username.trim();
    if username.is_empty() {
        return Err(ValidationError::EmptyUsername);
    }
    check_length(password)?;
    Ok(username.to_string())
}

pub fn validate_password_change(
    current: &Password,
    new: &Password,
    confirm: &Password,
) -> Result<(), ValidationError> {
    if current.0.expose_secret().is_empty() {
        return Err(ValidationError::MissingCurrentPassword);
    }
    if new.0.expose_secret() != confirm.0.expose_secret() {
        return Err(ValidationError::PasswordMismatch);
    }
    check_length(new)
}

/// Refuses deletion of the bootstrap account and of the signed-in admin.
pub fn validate_deletion(session: Option<&Session>, username: &str) -> Result<(), ValidationError> {
    if username == BOOTSTRAP_ADMIN {
        return Err(ValidationError::CannotDeleteBootstrap);
    }
    if session.is_some_and(|s| s.username == username) {
        return Err(ValidationError::CannotDeleteSelf);
    }
    Ok(())
}

fn check_length(password: &Password) -> Result<(), ValidationError> {
    // Counted in characters, not bytes.
    if password.0.expose_secret().chars().count() < MIN_PASSWORD_LENGTH {
        return Err(ValidationError::PasswordTooShort);
    }
    Ok(())
}

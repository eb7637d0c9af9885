//! Client-side form validation.
//!
//! Everything here runs before a request is built. A form that fails
//! validation never reaches the network.

use rust_decimal::Decimal;
use thiserror::Error;

use crate::types::EmailError;

/// A form or query failed client-side validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    Required(&'static str),

    #[error("{field} must be at most {max} characters")]
    TooLong { field: &'static str, max: usize },

    #[error("invalid email: {0}")]
    Email(#[from] EmailError),

    #[error("password must be at least {min} characters")]
    PasswordTooShort { min: usize },

    #[error("passwords do not match")]
    PasswordMismatch,

    #[error("new password must differ from the current one")]
    PasswordUnchanged,

    #[error("phone number must contain {min} to {max} digits")]
    InvalidPhone { min: usize, max: usize },

    #[error("minimum price {min} is greater than maximum price {max}")]
    PriceRange { min: Decimal, max: Decimal },

    #[error("{0} cannot be negative")]
    Negative(&'static str),

    #[error("{0} must be greater than zero")]
    Zero(&'static str),

    #[error("rating must be between 1 and 5 (got {0})")]
    Rating(u8),

    #[error("cart is empty")]
    EmptyCart,

    #[error("\"{0}\" is a sample item and cannot be ordered")]
    UnorderableItem(String),

    #[error("only {available} of \"{name}\" in stock (requested {requested})")]
    InsufficientStock {
        name: String,
        requested: u32,
        available: u32,
    },
}

/// Minimum password length accepted by the account forms.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Return the trimmed value or a `Required` error when blank.
///
/// # Errors
///
/// Returns [`ValidationError::Required`] if `value` is empty after trimming.
pub fn required<'a>(field: &'static str, value: &'a str) -> Result<&'a str, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(ValidationError::Required(field))
    } else {
        Ok(trimmed)
    }
}

/// Like [`required`] with an upper bound on length (in characters).
///
/// # Errors
///
/// Returns an error if blank or longer than `max` characters.
pub fn required_bounded<'a>(
    field: &'static str,
    value: &'a str,
    max: usize,
) -> Result<&'a str, ValidationError> {
    let trimmed = required(field, value)?;
    if trimmed.chars().count() > max {
        return Err(ValidationError::TooLong { field, max });
    }
    Ok(trimmed)
}

/// Trim an optional field, collapsing blank input to `None`.
#[must_use]
pub fn optional(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
}

/// Validate a phone number: 7–15 digits, ignoring spaces, dashes,
/// parentheses and a leading `+`.
///
/// # Errors
///
/// Returns [`ValidationError::Required`] when blank and
/// [`ValidationError::InvalidPhone`] on any other character or digit count.
pub fn phone(value: &str) -> Result<String, ValidationError> {
    const MIN: usize = 7;
    const MAX: usize = 15;

    let trimmed = required("phone", value)?;
    let body = trimmed.strip_prefix('+').unwrap_or(trimmed);
    let mut digits = 0usize;
    for ch in body.chars() {
        match ch {
            '0'..='9' => digits += 1,
            ' ' | '-' | '(' | ')' => {}
            _ => return Err(ValidationError::InvalidPhone { min: MIN, max: MAX }),
        }
    }
    if !(MIN..=MAX).contains(&digits) {
        return Err(ValidationError::InvalidPhone { min: MIN, max: MAX });
    }
    Ok(trimmed.to_owned())
}

/// Validate a new password and its confirmation.
///
/// # Errors
///
/// Returns an error if the password is shorter than
/// [`MIN_PASSWORD_LENGTH`] or the confirmation differs.
pub fn new_password(password: &str, confirmation: &str) -> Result<(), ValidationError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(ValidationError::PasswordTooShort {
            min: MIN_PASSWORD_LENGTH,
        });
    }
    if password != confirmation {
        return Err(ValidationError::PasswordMismatch);
    }
    Ok(())
}

/// Validate a money amount that may be zero but not negative.
///
/// # Errors
///
/// Returns [`ValidationError::Negative`] for negative amounts.
pub fn non_negative(field: &'static str, amount: Decimal) -> Result<Decimal, ValidationError> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(ValidationError::Negative(field));
    }
    Ok(amount)
}

//! User accounts and the forms that create or change them.

use serde::{Deserialize, Serialize};

use crate::types::{Email, UserId};
use crate::validation::{self, ValidationError};

/// The signed-in customer (or admin).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub name: String,
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

/// Returned by login and register.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthGrant {
    pub token: String,
    pub user: User,
}

/// Sign-in form.
#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Validated sign-in request body.
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: Email,
    pub password: String,
}

impl LoginForm {
    /// # Errors
    ///
    /// Returns an error for a malformed email or blank password.
    pub fn validate(&self) -> Result<LoginRequest, ValidationError> {
        let email = Email::parse(&self.email)?;
        if self.password.is_empty() {
            return Err(ValidationError::Required("password"));
        }
        Ok(LoginRequest {
            email,
            password: self.password.clone(),
        })
    }
}

/// Account creation form.
#[derive(Debug, Clone, Default)]
pub struct RegisterForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: Email,
    pub password: String,
}

impl RegisterForm {
    /// # Errors
    ///
    /// Returns the first failing field: name, email, then password rules.
    pub fn validate(&self) -> Result<RegisterRequest, ValidationError> {
        let name = validation::required_bounded("name", &self.name, 100)?.to_owned();
        let email = Email::parse(&self.email)?;
        validation::new_password(&self.password, &self.confirm_password)?;
        Ok(RegisterRequest {
            name,
            email,
            password: self.password.clone(),
        })
    }
}

/// Profile edit form.
#[derive(Debug, Clone, Default)]
pub struct ProfileForm {
    pub name: String,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProfileUpdate {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl ProfileForm {
    /// # Errors
    ///
    /// Returns an error for a blank name or a malformed phone number.
    pub fn validate(&self) -> Result<ProfileUpdate, ValidationError> {
        let name = validation::required_bounded("name", &self.name, 100)?.to_owned();
        let phone = match validation::optional(self.phone.as_deref()) {
            Some(raw) => Some(validation::phone(&raw)?),
            None => None,
        };
        Ok(ProfileUpdate { name, phone })
    }
}

/// Password change form.
#[derive(Debug, Clone, Default)]
pub struct PasswordForm {
    pub current_password: String,
    pub new_password: String,
    pub confirm_password: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordChange {
    pub current_password: String,
    pub new_password: String,
}

impl PasswordForm {
    /// # Errors
    ///
    /// Returns an error if the current password is blank, the new one is
    /// too short, unconfirmed, or identical to the current one.
    pub fn validate(&self) -> Result<PasswordChange, ValidationError> {
        if self.current_password.is_empty() {
            return Err(ValidationError::Required("current password"));
        }
        validation::new_password(&self.new_password, &self.confirm_password)?;
        if self.new_password == self.current_password {
            return Err(ValidationError::PasswordUnchanged);
        }
        Ok(PasswordChange {
            current_password: self.current_password.clone(),
            new_password: self.new_password.clone(),
        })
    }
}

//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type for every storefront action. Failures
//! that are not the user's fault are captured to Sentry by
//! [`AppError::report`]; [`AppError::user_message`] gives text safe to show.

use paperclip_core::ValidationError;
use thiserror::Error;

use crate::api::ApiError;
use crate::config::ConfigError;
use crate::storage::StorageError;

/// Application-level error type for the storefront client.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Input failed client-side validation.
    #[error("Invalid input: {0}")]
    Validation(#[from] ValidationError),

    /// Remote API call failed.
    #[error("API error: {0}")]
    Api(ApiError),

    /// Local storage could not be opened.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// The server ended the session; local session state has been cleared.
    #[error("Session expired")]
    SessionExpired,

    /// The action needs a signed-in user.
    #[error("Not signed in")]
    NotSignedIn,

    /// The action needs a confirmed admin.
    #[error("Admin access required")]
    Forbidden,

    /// Referenced item is not in the local cart or wishlist.
    #[error("Not found: {0}")]
    NotFound(String),
}

impl From<ApiError> for AppError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::SessionExpired => Self::SessionExpired,
            ApiError::Validation(v) => Self::Validation(v),
            other => Self::Api(other),
        }
    }
}

impl AppError {
    /// Whether this failure is worth an error report.
    #[must_use]
    pub fn is_reportable(&self) -> bool {
        match self {
            Self::Config(_) | Self::Storage(_) => true,
            Self::Api(err) => match err {
                ApiError::Api { status, .. } => *status >= 500,
                ApiError::Parse(_) | ApiError::MissingData | ApiError::Url(_) => true,
                _ => false,
            },
            _ => false,
        }
    }

    /// Capture to Sentry (if reportable) and log.
    pub fn report(&self) {
        if self.is_reportable() {
            let event_id = sentry::capture_error(self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Storefront error"
            );
        } else {
            tracing::debug!(error = %self, "Storefront action failed");
        }
    }

    /// Message suitable for the end user. Transport details are hidden.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Config(err) => err.to_string(),
            Self::Validation(err) => err.to_string(),
            Self::Api(err) => match err {
                ApiError::Http(e) if e.is_timeout() => {
                    "The shop took too long to respond. Please try again.".to_string()
                }
                ApiError::Http(_) => {
                    "Could not reach the shop. Check your connection and try again.".to_string()
                }
                ApiError::Api { status, .. } if *status >= 500 => {
                    "The shop is having trouble right now. Please try again later.".to_string()
                }
                ApiError::Api { message, .. } | ApiError::Rejected(message) => message.clone(),
                ApiError::Upload(message) => message.clone(),
                _ => "Unexpected response from the shop.".to_string(),
            },
            Self::Storage(_) => "Local data could not be saved.".to_string(),
            Self::SessionExpired => "Your session has expired. Please sign in again.".to_string(),
            Self::NotSignedIn => "Please sign in first.".to_string(),
            Self::Forbidden => "You do not have access to the back-office.".to_string(),
            Self::NotFound(what) => format!("{what} was not found."),
        }
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from a user ID.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
///
/// Call this on logout or session expiry.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of user actions
/// leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Added to cart", Some(&[("item", "p-123")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}

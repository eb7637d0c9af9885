//! Reviews, notifications and the contact / quote / newsletter forms.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{Email, NotificationId, ProductId, ReviewId};
use crate::validation::{self, ValidationError};

/// A customer review of a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: ReviewId,
    pub product_id: ProductId,
    pub user_name: String,
    pub rating: u8,
    #[serde(default)]
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

/// Review form.
#[derive(Debug, Clone, Default)]
pub struct ReviewForm {
    pub rating: u8,
    pub comment: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReview {
    pub product_id: ProductId,
    pub rating: u8,
    pub comment: String,
}

impl ReviewForm {
    /// # Errors
    ///
    /// Returns an error for a rating outside 1–5 or a blank comment.
    pub fn validate(&self, product_id: ProductId) -> Result<NewReview, ValidationError> {
        if !(1..=5).contains(&self.rating) {
            return Err(ValidationError::Rating(self.rating));
        }
        let comment = validation::required_bounded("comment", &self.comment, 1000)?.to_owned();
        Ok(NewReview {
            product_id,
            rating: self.rating,
            comment,
        })
    }
}

/// Average rating over a set of reviews, rounded to one decimal place.
#[must_use]
pub fn average_rating(reviews: &[Review]) -> Option<f32> {
    if reviews.is_empty() {
        return None;
    }
    let sum: u32 = reviews.iter().map(|r| u32::from(r.rating)).sum();
    #[allow(clippy::cast_precision_loss)] // review counts stay far below f32 precision limits
    let avg = sum as f32 / reviews.len() as f32;
    Some((avg * 10.0).round() / 10.0)
}

/// An in-app notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: NotificationId,
    pub title: String,
    pub message: String,
    #[serde(default)]
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

/// Contact form.
#[derive(Debug, Clone, Default)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub subject: Option<String>,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContactMessage {
    pub name: String,
    pub email: Email,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    pub message: String,
}

impl ContactForm {
    /// # Errors
    ///
    /// Returns an error for a blank name or message, or a malformed email.
    pub fn validate(&self) -> Result<ContactMessage, ValidationError> {
        Ok(ContactMessage {
            name: validation::required_bounded("name", &self.name, 100)?.to_owned(),
            email: Email::parse(&self.email)?,
            subject: validation::optional(self.subject.as_deref()),
            message: validation::required_bounded("message", &self.message, 5000)?.to_owned(),
        })
    }
}

/// Bulk / business quote request form.
#[derive(Debug, Clone, Default)]
pub struct QuoteForm {
    pub name: String,
    pub email: String,
    pub company: Option<String>,
    pub phone: Option<String>,
    pub products: String,
    pub quantity: Option<u32>,
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuoteRequest {
    pub name: String,
    pub email: Email,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub products: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl QuoteForm {
    /// # Errors
    ///
    /// Returns an error for missing contact details, a blank product list,
    /// a zero quantity, or a malformed phone number.
    pub fn validate(&self) -> Result<QuoteRequest, ValidationError> {
        if self.quantity == Some(0) {
            return Err(ValidationError::Zero("quantity"));
        }
        let phone = match validation::optional(self.phone.as_deref()) {
            Some(raw) => Some(validation::phone(&raw)?),
            None => None,
        };
        Ok(QuoteRequest {
            name: validation::required_bounded("name", &self.name, 100)?.to_owned(),
            email: Email::parse(&self.email)?,
            company: validation::optional(self.company.as_deref()),
            phone,
            products: validation::required_bounded("products", &self.products, 2000)?.to_owned(),
            quantity: self.quantity,
            message: validation::optional(self.message.as_deref()),
        })
    }
}

/// Body of the newsletter subscribe/unsubscribe calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewsletterRequest {
    pub email: Email,
}

impl NewsletterRequest {
    /// # Errors
    ///
    /// Returns an error for a malformed email.
    pub fn parse(email: &str) -> Result<Self, ValidationError> {
        Ok(Self {
            email: Email::parse(email)?,
        })
    }
}

//! Reviews, notifications, and the contact / quote / newsletter forms.

use paperclip_core::content::{ContactMessage, NewReview, NewsletterRequest, Notification, QuoteRequest, Review};
use paperclip_core::{NotificationId, ProductId};
use reqwest::Method;
use tracing::instrument;

use super::{ApiClient, ApiError};

impl ApiClient {
    // =========================================================================
    // Reviews
    // =========================================================================

    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn product_reviews(&self, product_id: &ProductId) -> Result<Vec<Review>, ApiError> {
        self.get(&["reviews", "product", product_id.as_str()]).await
    }

    /// # Errors
    ///
    /// Returns an error if the review is refused or the API request fails.
    #[instrument(skip(self, review), fields(product_id = %review.product_id))]
    pub async fn create_review(&self, review: &NewReview) -> Result<Review, ApiError> {
        self.send_json(Method::POST, &["reviews"], review).await
    }

    // =========================================================================
    // Notifications
    // =========================================================================

    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn notifications(&self) -> Result<Vec<Notification>, ApiError> {
        self.get(&["notifications"]).await
    }

    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(notification_id = %id))]
    pub async fn mark_notification_read(&self, id: &NotificationId) -> Result<(), ApiError> {
        self.send_json_empty(Method::PATCH, &["notifications", id.as_str(), "read"], &serde_json::json!({}))
            .await
    }

    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn mark_all_notifications_read(&self) -> Result<(), ApiError> {
        self.send_json_empty(Method::PATCH, &["notifications", "read-all"], &serde_json::json!({}))
            .await
    }

    // =========================================================================
    // Forms
    // =========================================================================

    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, message), fields(email = %message.email))]
    pub async fn send_contact(&self, message: &ContactMessage) -> Result<(), ApiError> {
        self.send_json_empty(Method::POST, &["contact"], message).await
    }

    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn request_quote(&self, request: &QuoteRequest) -> Result<(), ApiError> {
        self.send_json_empty(Method::POST, &["quote"], request).await
    }

    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn subscribe_newsletter(&self, request: &NewsletterRequest) -> Result<(), ApiError> {
        self.send_json_empty(Method::POST, &["newsletter", "subscribe"], request)
            .await
    }

    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn unsubscribe_newsletter(&self, request: &NewsletterRequest) -> Result<(), ApiError> {
        self.send_json_empty(Method::POST, &["newsletter", "unsubscribe"], request)
            .await
    }
}

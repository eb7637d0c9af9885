//! Customer account, order history, reviews, notifications and forms.

use paperclip_core::OrderId;
use paperclip_core::account::{AuthGrant, LoginForm, PasswordForm, ProfileForm, RegisterForm, User};
use paperclip_core::content::{
    ContactForm, NewsletterRequest, Notification, QuoteForm, Review, ReviewForm,
};
use paperclip_core::order::Order;
use paperclip_core::{NotificationId, ProductId};
use secrecy::SecretString;
use tracing::{info, instrument};

use super::Shop;
use crate::api::ImageUpload;
use crate::error::Result;
use crate::session::SessionState;

impl Shop {
    // =========================================================================
    // Authentication
    // =========================================================================

    /// # Errors
    ///
    /// Returns a validation error for a malformed form, or an error for
    /// wrong credentials.
    #[instrument(skip_all)]
    pub async fn login(&mut self, form: &LoginForm) -> Result<User> {
        let request = form.validate()?;
        let result = self.client.login(&request).await;
        let grant = self.settle(result)?;
        Ok(self.adopt_grant(grant))
    }

    /// # Errors
    ///
    /// Returns a validation error for a malformed form, or an error if the
    /// account cannot be created.
    #[instrument(skip_all)]
    pub async fn register(&mut self, form: &RegisterForm) -> Result<User> {
        let request = form.validate()?;
        let result = self.client.register(&request).await;
        let grant = self.settle(result)?;
        Ok(self.adopt_grant(grant))
    }

    fn adopt_grant(&mut self, grant: AuthGrant) -> User {
        let token = SecretString::from(grant.token);
        self.client.set_token(Some(token.clone()));
        info!(user_id = %grant.user.id, "Signed in");
        self.state.sign_in(&token, grant.user.clone());
        grant.user
    }

    /// Client-side sign-out. Cart and wishlist are kept.
    pub fn logout(&mut self) {
        self.client.set_token(None);
        self.state.sign_out();
        info!("Signed out");
    }

    // =========================================================================
    // Profile
    // =========================================================================

    /// # Errors
    ///
    /// Returns `NotSignedIn`, a validation error, or an API error.
    pub async fn update_profile(&mut self, form: &ProfileForm) -> Result<User> {
        self.require_user()?;
        let update = form.validate()?;
        let result = self.client.update_profile(&update).await;
        let user = self.settle(result)?;
        Ok(self.refresh_user(user))
    }

    /// # Errors
    ///
    /// Returns `NotSignedIn`, or an error if the image is refused.
    pub async fn upload_avatar(&mut self, image: ImageUpload) -> Result<User> {
        self.require_user()?;
        let result = self.client.upload_avatar(image).await;
        let user = self.settle(result)?;
        Ok(self.refresh_user(user))
    }

    /// # Errors
    ///
    /// Returns `NotSignedIn`, a validation error, or an error if the current
    /// password is wrong.
    pub async fn change_password(&mut self, form: &PasswordForm) -> Result<()> {
        self.require_user()?;
        let change = form.validate()?;
        let result = self.client.change_password(&change).await;
        self.settle(result)
    }

    fn refresh_user(&mut self, user: User) -> User {
        self.state.set_session(SessionState::Confirmed(user.clone()));
        user
    }

    // =========================================================================
    // Orders
    // =========================================================================

    /// # Errors
    ///
    /// Returns `NotSignedIn` or an API error.
    pub async fn my_orders(&mut self) -> Result<Vec<Order>> {
        self.require_user()?;
        let result = self.client.my_orders().await;
        self.settle(result)
    }

    /// # Errors
    ///
    /// Returns `NotSignedIn` or an API error.
    pub async fn order(&mut self, id: &OrderId) -> Result<Order> {
        self.require_user()?;
        let result = self.client.get_order(id).await;
        self.settle(result)
    }

    /// # Errors
    ///
    /// Returns `NotSignedIn` or an error if the order can no longer be
    /// cancelled.
    pub async fn cancel_order(&mut self, id: &OrderId) -> Result<Order> {
        self.require_user()?;
        let result = self.client.cancel_order(id).await;
        self.settle(result)
    }

    // =========================================================================
    // Reviews
    // =========================================================================

    /// # Errors
    ///
    /// Returns an error if the API request fails.
    pub async fn reviews(&mut self, product_id: &ProductId) -> Result<Vec<Review>> {
        let result = self.client.product_reviews(product_id).await;
        self.settle(result)
    }

    /// # Errors
    ///
    /// Returns `NotSignedIn`, a validation error, or an API error.
    pub async fn add_review(&mut self, product_id: &ProductId, form: &ReviewForm) -> Result<Review> {
        self.require_user()?;
        let review = form.validate(product_id.clone())?;
        let result = self.client.create_review(&review).await;
        self.settle(result)
    }

    // =========================================================================
    // Notifications
    // =========================================================================

    /// # Errors
    ///
    /// Returns `NotSignedIn` or an API error.
    pub async fn notifications(&mut self) -> Result<Vec<Notification>> {
        self.require_user()?;
        let result = self.client.notifications().await;
        self.settle(result)
    }

    /// # Errors
    ///
    /// Returns `NotSignedIn` or an API error.
    pub async fn mark_notification_read(&mut self, id: &NotificationId) -> Result<()> {
        self.require_user()?;
        let result = self.client.mark_notification_read(id).await;
        self.settle(result)
    }

    /// # Errors
    ///
    /// Returns `NotSignedIn` or an API error.
    pub async fn mark_all_notifications_read(&mut self) -> Result<()> {
        self.require_user()?;
        let result = self.client.mark_all_notifications_read().await;
        self.settle(result)
    }

    // =========================================================================
    // Forms
    // =========================================================================

    /// # Errors
    ///
    /// Returns a validation error or an API error.
    pub async fn send_contact(&mut self, form: &ContactForm) -> Result<()> {
        let message = form.validate()?;
        let result = self.client.send_contact(&message).await;
        self.settle(result)
    }

    /// # Errors
    ///
    /// Returns a validation error or an API error.
    pub async fn request_quote(&mut self, form: &QuoteForm) -> Result<()> {
        let request = form.validate()?;
        let result = self.client.request_quote(&request).await;
        self.settle(result)
    }

    /// # Errors
    ///
    /// Returns a validation error for a malformed email or an API error.
    pub async fn subscribe_newsletter(&mut self, email: &str) -> Result<()> {
        let request = NewsletterRequest::parse(email)?;
        let result = self.client.subscribe_newsletter(&request).await;
        self.settle(result)
    }

    /// # Errors
    ///
    /// Returns a validation error for a malformed email or an API error.
    pub async fn unsubscribe_newsletter(&mut self, email: &str) -> Result<()> {
        let request = NewsletterRequest::parse(email)?;
        let result = self.client.unsubscribe_newsletter(&request).await;
        self.settle(result)
    }
}

//! Account endpoints under `/auth`.
//!
//! A 401 here means bad credentials, not an expired session, so the
//! interceptor leaves these paths alone.

use paperclip_core::account::{
    AuthGrant, LoginRequest, PasswordChange, ProfileUpdate, RegisterRequest, User,
};
use reqwest::Method;
use reqwest::multipart::Form;
use tracing::instrument;

use super::{ApiClient, ApiError, ImageUpload};

impl ApiClient {
    // =========================================================================
    // Authentication
    // =========================================================================

    /// Exchange credentials for a token.
    ///
    /// # Errors
    ///
    /// Returns an error for wrong credentials or if the API request fails.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn login(&self, request: &LoginRequest) -> Result<AuthGrant, ApiError> {
        self.send_json(Method::POST, &["auth", "login"], request).await
    }

    /// Create an account and sign in.
    ///
    /// # Errors
    ///
    /// Returns an error if the email is taken or the API request fails.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn register(&self, request: &RegisterRequest) -> Result<AuthGrant, ApiError> {
        self.send_json(Method::POST, &["auth", "register"], request).await
    }

    /// Resolve the current token to its user.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is not accepted or the request fails.
    #[instrument(skip(self))]
    pub async fn me(&self) -> Result<User, ApiError> {
        self.get(&["auth", "me"]).await
    }

    // =========================================================================
    // Profile
    // =========================================================================

    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, update))]
    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<User, ApiError> {
        self.send_json(Method::PUT, &["auth", "profile"], update).await
    }

    /// Replace the profile picture.
    ///
    /// # Errors
    ///
    /// Returns an error if the image is rejected or the API request fails.
    #[instrument(skip(self, image), fields(file = %image.file_name()))]
    pub async fn upload_avatar(&self, image: ImageUpload) -> Result<User, ApiError> {
        let form = Form::new().part("avatar", image.into_part()?);
        self.send_multipart(Method::POST, &["auth", "profile", "picture"], form)
            .await
    }

    /// # Errors
    ///
    /// Returns an error if the current password is wrong or the request fails.
    #[instrument(skip_all)]
    pub async fn change_password(&self, change: &PasswordChange) -> Result<(), ApiError> {
        self.send_json_empty(Method::PUT, &["auth", "password"], change)
            .await
    }
}

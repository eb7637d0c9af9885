//! Back-office endpoints. The server enforces the admin role; the client
//! only calls them.

use paperclip_core::account::User;
use paperclip_core::admin::{DashboardStats, ProductInput, StatusUpdate};
use paperclip_core::order::Order;
use paperclip_core::shipping::{ShippingZone, ShippingZoneInput};
use paperclip_core::{OrderId, OrderStatus, Product, ProductId, ShippingZoneId, UserId};
use reqwest::Method;
use reqwest::multipart::Form;
use tracing::{info, instrument};

use super::{ApiClient, ApiError, ImageUpload};

impl ApiClient {
    // =========================================================================
    // Dashboard
    // =========================================================================

    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn dashboard_stats(&self) -> Result<DashboardStats, ApiError> {
        self.get(&["dashboard", "stats"]).await
    }

    // =========================================================================
    // Orders
    // =========================================================================

    /// Every order in the shop.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn all_orders(&self) -> Result<Vec<Order>, ApiError> {
        self.get(&["orders"]).await
    }

    /// # Errors
    ///
    /// Returns an error if the transition is refused or the request fails.
    #[instrument(skip(self), fields(order_id = %id))]
    pub async fn update_order_status(&self, id: &OrderId, status: OrderStatus) -> Result<Order, ApiError> {
        self.send_json(
            Method::PUT,
            &["orders", id.as_str(), "status"],
            &StatusUpdate { status },
        )
        .await
    }

    // =========================================================================
    // Users
    // =========================================================================

    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn list_users(&self) -> Result<Vec<User>, ApiError> {
        self.get(&["dashboard", "users"]).await
    }

    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(user_id = %id))]
    pub async fn delete_user(&self, id: &UserId) -> Result<(), ApiError> {
        self.delete(&["dashboard", "users", id.as_str()]).await
    }

    /// Flip the admin flag; returns the updated user.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(user_id = %id))]
    pub async fn toggle_admin(&self, id: &UserId) -> Result<User, ApiError> {
        self.send_json(
            Method::PATCH,
            &["dashboard", "users", id.as_str(), "toggle-admin"],
            &serde_json::json!({}),
        )
        .await
    }

    // =========================================================================
    // Products
    // =========================================================================

    /// Create a product, optionally with an image. Always multipart.
    ///
    /// # Errors
    ///
    /// Returns an error if the product is refused or the request fails.
    #[instrument(skip(self, input, image), fields(name = %input.name))]
    pub async fn create_product(
        &self,
        input: &ProductInput,
        image: Option<ImageUpload>,
    ) -> Result<Product, ApiError> {
        let mut form = input
            .to_form_fields()
            .into_iter()
            .fold(Form::new(), |form, (name, value)| form.text(name, value));
        if let Some(image) = image {
            form = form.part("image", image.into_part()?);
        }

        let product: Product = self.send_multipart(Method::POST, &["products"], form).await?;
        self.invalidate_catalog();
        info!(product_id = ?product.server_id(), "Product created");
        Ok(product)
    }

    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, input), fields(product_id = %id))]
    pub async fn update_product(&self, id: &ProductId, input: &ProductInput) -> Result<Product, ApiError> {
        let product = self
            .send_json(Method::PUT, &["products", id.as_str()], input)
            .await?;
        self.invalidate_catalog();
        Ok(product)
    }

    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn delete_product(&self, id: &ProductId) -> Result<(), ApiError> {
        self.delete(&["products", id.as_str()]).await?;
        self.invalidate_catalog();
        info!("Product deleted");
        Ok(())
    }

    // =========================================================================
    // Shipping zones
    // =========================================================================

    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create_shipping_zone(&self, input: &ShippingZoneInput) -> Result<ShippingZone, ApiError> {
        self.send_json(Method::POST, &["shipping", "zones"], input)
            .await
    }

    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, input), fields(zone_id = %id))]
    pub async fn update_shipping_zone(
        &self,
        id: &ShippingZoneId,
        input: &ShippingZoneInput,
    ) -> Result<ShippingZone, ApiError> {
        self.send_json(Method::PUT, &["shipping", "zones", id.as_str()], input)
            .await
    }

    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(zone_id = %id))]
    pub async fn delete_shipping_zone(&self, id: &ShippingZoneId) -> Result<(), ApiError> {
        self.delete(&["shipping", "zones", id.as_str()]).await
    }
}

//! Back-office calls, gated on a confirmed admin session.

use paperclip_core::account::User;
use paperclip_core::admin::{DashboardStats, ProductForm};
use paperclip_core::order::Order;
use paperclip_core::shipping::{ShippingZone, ShippingZoneInput};
use paperclip_core::{OrderId, OrderStatus, Product, ProductId, ShippingZoneId, UserId};
use tracing::info;

use super::Shop;
use crate::api::ImageUpload;
use crate::error::{Result, add_breadcrumb};

impl Shop {
    /// # Errors
    ///
    /// Returns `Forbidden` for non-admins, or an API error.
    pub async fn dashboard(&mut self) -> Result<DashboardStats> {
        self.require_admin()?;
        let result = self.client.dashboard_stats().await;
        self.settle(result)
    }

    // =========================================================================
    // Orders
    // =========================================================================

    /// # Errors
    ///
    /// Returns `Forbidden` for non-admins, or an API error.
    pub async fn all_orders(&mut self) -> Result<Vec<Order>> {
        self.require_admin()?;
        let result = self.client.all_orders().await;
        self.settle(result)
    }

    /// # Errors
    ///
    /// Returns `Forbidden` for non-admins, or an error if the transition is
    /// refused.
    pub async fn update_order_status(&mut self, id: &OrderId, status: OrderStatus) -> Result<Order> {
        self.require_admin()?;
        add_breadcrumb("admin", "Order status change", Some(&[("order", id.as_str())]));
        let result = self.client.update_order_status(id, status).await;
        self.settle(result)
    }

    // =========================================================================
    // Users
    // =========================================================================

    /// # Errors
    ///
    /// Returns `Forbidden` for non-admins, or an API error.
    pub async fn users(&mut self) -> Result<Vec<User>> {
        self.require_admin()?;
        let result = self.client.list_users().await;
        self.settle(result)
    }

    /// # Errors
    ///
    /// Returns `Forbidden` for non-admins, or an API error.
    pub async fn delete_user(&mut self, id: &UserId) -> Result<()> {
        self.require_admin()?;
        let result = self.client.delete_user(id).await;
        self.settle(result)?;
        info!(user_id = %id, "User deleted");
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `Forbidden` for non-admins, or an API error.
    pub async fn toggle_admin(&mut self, id: &UserId) -> Result<User> {
        self.require_admin()?;
        let result = self.client.toggle_admin(id).await;
        self.settle(result)
    }

    // =========================================================================
    // Products
    // =========================================================================

    /// # Errors
    ///
    /// Returns `Forbidden` for non-admins, a validation error, or an API error.
    pub async fn create_product(&mut self, form: &ProductForm, image: Option<ImageUpload>) -> Result<Product> {
        self.require_admin()?;
        let input = form.validate()?;
        let result = self.client.create_product(&input, image).await;
        self.settle(result)
    }

    /// # Errors
    ///
    /// Returns `Forbidden` for non-admins, a validation error, or an API error.
    pub async fn update_product(&mut self, id: &ProductId, form: &ProductForm) -> Result<Product> {
        self.require_admin()?;
        let input = form.validate()?;
        let result = self.client.update_product(id, &input).await;
        self.settle(result)
    }

    /// # Errors
    ///
    /// Returns `Forbidden` for non-admins, or an API error.
    pub async fn delete_product(&mut self, id: &ProductId) -> Result<()> {
        self.require_admin()?;
        let result = self.client.delete_product(id).await;
        self.settle(result)
    }

    // =========================================================================
    // Shipping zones
    // =========================================================================

    /// # Errors
    ///
    /// Returns `Forbidden` for non-admins, or an API error.
    pub async fn shipping_zones(&mut self) -> Result<Vec<ShippingZone>> {
        self.require_admin()?;
        let result = self.client.shipping_zones().await;
        self.settle(result)
    }

    /// # Errors
    ///
    /// Returns `Forbidden` for non-admins, a validation error, or an API error.
    pub async fn create_shipping_zone(&mut self, input: &ShippingZoneInput) -> Result<ShippingZone> {
        self.require_admin()?;
        let input = input.validate()?;
        let result = self.client.create_shipping_zone(&input).await;
        self.settle(result)
    }

    /// # Errors
    ///
    /// Returns `Forbidden` for non-admins, a validation error, or an API error.
    pub async fn update_shipping_zone(
        &mut self,
        id: &ShippingZoneId,
        input: &ShippingZoneInput,
    ) -> Result<ShippingZone> {
        self.require_admin()?;
        let input = input.validate()?;
        let result = self.client.update_shipping_zone(id, &input).await;
        self.settle(result)
    }

    /// # Errors
    ///
    /// Returns `Forbidden` for non-admins, or an API error.
    pub async fn delete_shipping_zone(&mut self, id: &ShippingZoneId) -> Result<()> {
        self.require_admin()?;
        let result = self.client.delete_shipping_zone(id).await;
        self.settle(result)
    }
}

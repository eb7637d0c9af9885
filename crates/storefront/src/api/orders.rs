//! Order and shipping endpoints.

use paperclip_core::OrderId;
use paperclip_core::order::{NewOrder, Order};
use paperclip_core::shipping::{ShippingQuote, ShippingQuoteRequest, ShippingZone};
use reqwest::Method;
use tracing::instrument;

use super::{ApiClient, ApiError};

impl ApiClient {
    // =========================================================================
    // Orders
    // =========================================================================

    /// # Errors
    ///
    /// Returns an error if the order is refused or the API request fails.
    #[instrument(skip(self, order), fields(lines = order.items.len()))]
    pub async fn place_order(&self, order: &NewOrder) -> Result<Order, ApiError> {
        self.send_json(Method::POST, &["orders"], order).await
    }

    /// Orders placed by the signed-in customer.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn my_orders(&self) -> Result<Vec<Order>, ApiError> {
        self.get(&["orders", "my"]).await
    }

    /// # Errors
    ///
    /// Returns an error if the order is not found or the API request fails.
    #[instrument(skip(self), fields(order_id = %id))]
    pub async fn get_order(&self, id: &OrderId) -> Result<Order, ApiError> {
        self.get(&["orders", id.as_str()]).await
    }

    /// # Errors
    ///
    /// Returns an error if the order can no longer be cancelled or the
    /// API request fails.
    #[instrument(skip(self), fields(order_id = %id))]
    pub async fn cancel_order(&self, id: &OrderId) -> Result<Order, ApiError> {
        self.send_json(Method::PUT, &["orders", id.as_str(), "cancel"], &serde_json::json!({}))
            .await
    }

    // =========================================================================
    // Shipping
    // =========================================================================

    /// Quote delivery cost for a city and cart subtotal.
    ///
    /// # Errors
    ///
    /// Returns an error if the city is not served or the API request fails.
    #[instrument(skip(self))]
    pub async fn quote_shipping(&self, request: &ShippingQuoteRequest) -> Result<ShippingQuote, ApiError> {
        self.send_json(Method::POST, &["shipping", "calculate"], request)
            .await
    }

    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn shipping_zones(&self) -> Result<Vec<ShippingZone>, ApiError> {
        self.get(&["shipping", "zones"]).await
    }
}

//! Checkout: shipping quote and order placement.
//!
//! The cart is cleared only after the server accepts the order. Any failure
//! before that point leaves the cart as it was.

use std::future::Future;

use paperclip_core::order::{NewOrder, Order, ShippingDetails};
use paperclip_core::shipping::{ShippingQuote, ShippingQuoteRequest};
use paperclip_core::validation::{self, ValidationError};
use paperclip_core::{Cart, PaymentMethod};
use rust_decimal::Decimal;
use tracing::{info, instrument};

use crate::api::{ApiClient, ApiError};
use crate::error::{AppError, Result, add_breadcrumb};
use crate::state::ShopState;

/// The two calls checkout needs from the backend.
pub trait CheckoutBackend {
    fn shipping_quote(
        &self,
        request: &ShippingQuoteRequest,
    ) -> impl Future<Output = std::result::Result<ShippingQuote, ApiError>> + Send;

    fn submit_order(&self, order: &NewOrder) -> impl Future<Output = std::result::Result<Order, ApiError>> + Send;
}

impl CheckoutBackend for ApiClient {
    async fn shipping_quote(&self, request: &ShippingQuoteRequest) -> std::result::Result<ShippingQuote, ApiError> {
        self.quote_shipping(request).await
    }

    async fn submit_order(&self, order: &NewOrder) -> std::result::Result<Order, ApiError> {
        self.place_order(order).await
    }
}

/// Order totals shown before the customer confirms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutSummary {
    pub subtotal: Decimal,
    pub shipping: ShippingQuote,
    pub total: Decimal,
}

impl CheckoutSummary {
    #[must_use]
    pub fn new(subtotal: Decimal, shipping: ShippingQuote) -> Self {
        let shipping_cost = if shipping.free_shipping {
            Decimal::ZERO
        } else {
            shipping.cost
        };
        Self {
            subtotal,
            total: subtotal + shipping_cost,
            shipping,
        }
    }

    /// Shipping actually charged.
    #[must_use]
    pub fn shipping_cost(&self) -> Decimal {
        self.total - self.subtotal
    }
}

/// Quote shipping for the cart to `city`.
///
/// # Errors
///
/// Returns a validation error for an empty cart or blank city, or an error
/// if the API request fails.
#[instrument(skip(backend, cart), fields(items = cart.len()))]
pub async fn quote<B>(backend: &B, cart: &Cart, city: &str) -> Result<CheckoutSummary>
where
    B: CheckoutBackend + Sync,
{
    if cart.is_empty() {
        return Err(ValidationError::EmptyCart.into());
    }
    let city = validation::required("city", city)?;
    let subtotal = cart.total();
    let request = ShippingQuoteRequest {
        city: city.to_string(),
        subtotal,
    };
    let quote = backend.shipping_quote(&request).await?;
    Ok(CheckoutSummary::new(subtotal, quote))
}

/// Validate the cart and shipping details, place the order, then clear the
/// cart.
///
/// # Errors
///
/// Returns `NotSignedIn` without a session, a validation error for bad input
/// (no request is made), or an error if the API refuses the order. The cart
/// is untouched on every error path.
#[instrument(skip_all, fields(items = state.cart().len(), payment = %payment_method))]
pub async fn place_order<B>(
    backend: &B,
    state: &mut ShopState,
    shipping: &ShippingDetails,
    payment_method: PaymentMethod,
) -> Result<Order>
where
    B: CheckoutBackend + Sync,
{
    if !state.session().is_signed_in() {
        return Err(AppError::NotSignedIn);
    }
    let request = NewOrder::from_cart(state.cart(), shipping, payment_method)?;

    add_breadcrumb("checkout", "Placing order", None);
    let order = backend.submit_order(&request).await?;

    state.clear_cart();
    info!(order = %order.reference(), total = %order.total, "Order placed");
    Ok(order)
}

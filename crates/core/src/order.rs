//! Orders: the checkout request and the read-only projection the backend
//! returns.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::cart::Cart;
use crate::types::{OrderId, OrderStatus, PaymentMethod, ProductId, UserId};
use crate::validation::{self, ValidationError};

/// Delivery details entered at checkout.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingDetails {
    pub full_name: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl ShippingDetails {
    /// Trim and check the delivery form.
    ///
    /// # Errors
    ///
    /// Returns an error for a blank name, address or city, or a malformed
    /// phone number.
    pub fn validate(&self) -> Result<Self, ValidationError> {
        Ok(Self {
            full_name: validation::required_bounded("full name", &self.full_name, 100)?.to_owned(),
            phone: validation::phone(&self.phone)?,
            address: validation::required_bounded("address", &self.address, 200)?.to_owned(),
            city: validation::required_bounded("city", &self.city, 100)?.to_owned(),
            postal_code: validation::optional(self.postal_code.as_deref()),
            notes: validation::optional(self.notes.as_deref()),
        })
    }
}

/// One line of an order request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLineRequest {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// Body of `POST /orders`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
    pub items: Vec<OrderLineRequest>,
    pub shipping: ShippingDetails,
    pub payment_method: PaymentMethod,
}

impl NewOrder {
    /// Build an order request from the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart is empty, holds a client-only item, or a
    /// line asks for more than the last known stock, or if the shipping
    /// details fail validation.
    pub fn from_cart(
        cart: &Cart,
        shipping: &ShippingDetails,
        payment_method: PaymentMethod,
    ) -> Result<Self, ValidationError> {
        if cart.is_empty() {
            return Err(ValidationError::EmptyCart);
        }

        let mut items = Vec::with_capacity(cart.len());
        for item in cart.items() {
            let Some(product_id) = item.product.server_id() else {
                return Err(ValidationError::UnorderableItem(item.product.name.clone()));
            };
            if item.quantity() > item.product.stock {
                return Err(ValidationError::InsufficientStock {
                    name: item.product.name.clone(),
                    requested: item.quantity(),
                    available: item.product.stock,
                });
            }
            items.push(OrderLineRequest {
                product_id: product_id.clone(),
                quantity: item.quantity(),
            });
        }

        Ok(Self {
            items,
            shipping: shipping.validate()?,
            payment_method,
        })
    }
}

/// A line of a placed order, priced at the time of purchase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub product_id: ProductId,
    pub name: String,
    pub price: Decimal,
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// Read-only projection of an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    #[serde(default)]
    pub order_number: Option<String>,
    #[serde(default)]
    pub user_id: Option<UserId>,
    pub status: OrderStatus,
    pub items: Vec<OrderLine>,
    pub subtotal: Decimal,
    pub shipping_cost: Decimal,
    pub total: Decimal,
    pub shipping: ShippingDetails,
    #[serde(default)]
    pub payment_method: PaymentMethod,
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Human-facing reference: the order number, else the id.
    #[must_use]
    pub fn reference(&self) -> &str {
        self.order_number.as_deref().unwrap_or(self.id.as_str())
    }

    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|l| l.quantity).sum()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::catalog::Product;
    use crate::types::ItemKey;

    fn details() -> ShippingDetails {
        ShippingDetails {
            full_name: " Grace Hopper ".to_string(),
            phone: "555 010 2000".to_string(),
            address: "1 Compiler Way".to_string(),
            city: "Arlington".to_string(),
            postal_code: Some(String::new()),
            notes: None,
        }
    }

    fn stocked(id: &str, stock: u32) -> Product {
        let mut p = Product::sample(id, "Printers", Decimal::new(199, 0));
        p.key = ItemKey::server(ProductId::new(id));
        p.stock = stock;
        p
    }

    #[test]
    fn test_details_trimmed() {
        let valid = details().validate().unwrap();
        assert_eq!(valid.full_name, "Grace Hopper");
        assert!(valid.postal_code.is_none());
    }

    #[test]
    fn test_details_require_city() {
        let mut d = details();
        d.city = String::new();
        assert_eq!(d.validate().unwrap_err(), ValidationError::Required("city"));
    }

    #[test]
    fn test_from_cart_empty() {
        let err = NewOrder::from_cart(&Cart::new(), &details(), PaymentMethod::Card).unwrap_err();
        assert_eq!(err, ValidationError::EmptyCart);
    }

    #[test]
    fn test_from_cart_rejects_sample_items() {
        let mut cart = Cart::new();
        cart.add(Product::sample("Demo Desk", "Furniture", Decimal::TEN));
        let err = NewOrder::from_cart(&cart, &details(), PaymentMethod::Card).unwrap_err();
        assert_eq!(err, ValidationError::UnorderableItem("Demo Desk".to_string()));
    }

    #[test]
    fn test_from_cart_checks_stock() {
        let mut cart = Cart::new();
        cart.add(stocked("p1", 1));
        cart.add(stocked("p1", 1));
        let err = NewOrder::from_cart(&cart, &details(), PaymentMethod::Card).unwrap_err();
        assert!(matches!(err, ValidationError::InsufficientStock { requested: 2, available: 1, .. }));
    }

    #[test]
    fn test_from_cart_builds_lines() {
        let mut cart = Cart::new();
        cart.add(stocked("p1", 5));
        cart.add(stocked("p1", 5));
        cart.add(stocked("p2", 5));
        let order = NewOrder::from_cart(&cart, &details(), PaymentMethod::BankTransfer).unwrap();
        assert_eq!(order.items.len(), 2);
        assert_eq!(order.items.first().unwrap().quantity, 2);

        let json = serde_json::to_value(&order).unwrap();
        assert_eq!(json["paymentMethod"], "bank_transfer");
        assert_eq!(json["items"][0]["productId"], "p1");
    }

    #[test]
    fn test_order_reference() {
        let order: Order = serde_json::from_value(serde_json::json!({
            "id": "o-1",
            "status": "pending",
            "items": [{"productId": "p1", "name": "Toner", "price": "40", "quantity": 2}],
            "subtotal": "80",
            "shippingCost": "5",
            "total": "85",
            "shipping": {"fullName": "A", "phone": "5550100", "address": "x", "city": "y"},
            "createdAt": "2026-01-05T10:00:00Z"
        }))
        .unwrap();
        assert_eq!(order.reference(), "o-1");
        assert_eq!(order.item_count(), 2);
    }
}

//! Subcommand handlers and plain-text rendering.

pub mod account;
pub mod admin;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod content;

use paperclip_core::order::Order;
use paperclip_core::{CurrencyCode, Price, Product};
use paperclip_storefront::reconcile::RemovalNotice;
use rust_decimal::Decimal;

/// Renders domain values to stdout.
#[derive(Debug, Clone, Copy)]
pub struct Output {
    currency: CurrencyCode,
}

impl Output {
    pub const fn new(currency: CurrencyCode) -> Self {
        Self { currency }
    }

    pub const fn price(self, amount: Decimal) -> Price {
        Price::new(amount, self.currency)
    }

    pub fn product_line(self, product: &Product) -> String {
        let mut line = format!(
            "{:<26} {:<32} {:>12}",
            product.key.to_string(),
            product.name,
            self.price(product.price).to_string()
        );
        if let Some(percent) = product.discount_percent() {
            line.push_str(&format!("  -{percent}%"));
        }
        if product.stock == 0 {
            line.push_str("  (out of stock)");
        }
        line
    }

    pub fn order_line(self, order: &Order) -> String {
        format!(
            "{:<14} {:<11} {:>3} items {:>12}  {}",
            order.reference(),
            order.status.to_string(),
            order.item_count(),
            self.price(order.total).to_string(),
            order.created_at.format("%Y-%m-%d"),
        )
    }

    pub fn order_detail(self, order: &Order) {
        println!("Order {} ({})", order.reference(), order.status);
        println!("Placed {}", order.created_at.format("%Y-%m-%d %H:%M"));
        for line in &order.items {
            println!(
                "  {:>3} x {:<32} {:>12}",
                line.quantity,
                line.name,
                self.price(line.price * Decimal::from(line.quantity)).to_string()
            );
        }
        println!("Subtotal {:>12}", self.price(order.subtotal).to_string());
        println!("Shipping {:>12}", self.price(order.shipping_cost).to_string());
        println!("Total    {:>12}", self.price(order.total).to_string());
        println!(
            "Ship to  {}, {}, {} ({})",
            order.shipping.full_name, order.shipping.address, order.shipping.city, order.payment_method
        );
    }
}

/// Print a removal notice, if one was raised.
pub fn notice(notice: Option<RemovalNotice>) {
    if let Some(notice) = notice {
        println!("! {notice}");
    }
}

/// Read an optional flag as `None` when blank.
pub fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_product_line_flags_stock() {
        let out = Output::new(CurrencyCode::USD);
        let mut product = Product::sample("Stapler", "Desk", Decimal::new(1250, 2));
        let line = out.product_line(&product);
        assert!(line.contains("$12.50"));
        assert!(line.contains("out of stock"));

        product.stock = 4;
        assert!(!out.product_line(&product).contains("out of stock"));
    }

    #[test]
    fn test_non_blank() {
        assert_eq!(non_blank(Some("  ".to_string())), None);
        assert_eq!(non_blank(Some("x".to_string())), Some("x".to_string()));
    }
}

//! Back-office types: dashboard analytics and product editing.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::catalog::Product;
use crate::order::Order;
use crate::types::OrderStatus;
use crate::validation::{self, ValidationError};

/// Dashboard analytics summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_revenue: Decimal,
    pub total_orders: u64,
    pub total_products: u64,
    pub total_users: u64,
    #[serde(default)]
    pub pending_orders: u64,
    #[serde(default)]
    pub recent_orders: Vec<Order>,
    #[serde(default)]
    pub low_stock: Vec<Product>,
}

/// Body of the order status update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusUpdate {
    pub status: OrderStatus,
}

/// Product create/update form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductForm {
    pub name: String,
    pub category: String,
    pub price: Decimal,
    pub original_price: Option<Decimal>,
    pub stock: u32,
    pub brand: Option<String>,
    pub description: Option<String>,
    pub tags: Vec<String>,
}

/// Validated product fields, sent as JSON or as multipart text parts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductInput {
    pub name: String,
    pub category: String,
    pub price: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_price: Option<Decimal>,
    pub stock: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub tags: Vec<String>,
}

impl ProductForm {
    /// # Errors
    ///
    /// Returns an error for a blank name or category, a non-positive price,
    /// or an original price that is not above the price.
    pub fn validate(&self) -> Result<ProductInput, ValidationError> {
        let name = validation::required_bounded("product name", &self.name, 200)?.to_owned();
        let category = validation::required_bounded("category", &self.category, 100)?.to_owned();
        validation::non_negative("price", self.price)?;
        if self.price.is_zero() {
            return Err(ValidationError::Zero("price"));
        }
        if let Some(original) = self.original_price
            && original <= self.price
        {
            return Err(ValidationError::PriceRange {
                min: self.price,
                max: original,
            });
        }
        let tags = self
            .tags
            .iter()
            .map(|t| t.trim().to_lowercase())
            .filter(|t| !t.is_empty())
            .collect();
        Ok(ProductInput {
            name,
            category,
            price: self.price,
            original_price: self.original_price,
            stock: self.stock,
            brand: validation::optional(self.brand.as_deref()),
            description: validation::optional(self.description.as_deref()),
            tags,
        })
    }
}

impl ProductInput {
    /// Field/value pairs for a multipart upload.
    #[must_use]
    pub fn to_form_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![
            ("name", self.name.clone()),
            ("category", self.category.clone()),
            ("price", self.price.to_string()),
            ("stock", self.stock.to_string()),
        ];
        if let Some(original) = self.original_price {
            fields.push(("originalPrice", original.to_string()));
        }
        if let Some(brand) = &self.brand {
            fields.push(("brand", brand.clone()));
        }
        if let Some(description) = &self.description {
            fields.push(("description", description.clone()));
        }
        if !self.tags.is_empty() {
            fields.push(("tags", self.tags.join(",")));
        }
        fields
    }
}

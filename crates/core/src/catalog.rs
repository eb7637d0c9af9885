//! Catalog types: products, listing pages and the search/filter/sort query.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

use crate::types::{ItemKey, LocalItemId, ProductId};
use crate::validation::ValidationError;

/// A product as listed by the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Server or client-only identity (flattened: `id` or `local_id`).
    #[serde(flatten)]
    pub key: ItemKey,
    pub name: String,
    pub category: String,
    pub price: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_price: Option<Decimal>,
    /// Discount in whole percent, when the backend supplies one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount: Option<u8>,
    #[serde(default)]
    pub stock: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f32>,
}

impl Product {
    /// Build a client-only sample product with a fresh local identity.
    #[must_use]
    pub fn sample(name: impl Into<String>, category: impl Into<String>, price: Decimal) -> Self {
        Self {
            key: LocalItemId::generate().into(),
            name: name.into(),
            category: category.into(),
            price,
            original_price: None,
            discount: None,
            stock: 0,
            image: None,
            tags: Vec::new(),
            brand: None,
            description: None,
            rating: None,
        }
    }

    /// Server id, if this product came from the backend.
    #[must_use]
    pub const fn server_id(&self) -> Option<&ProductId> {
        self.key.server_id()
    }

    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.stock > 0
    }

    /// Effective discount in percent.
    ///
    /// Uses the explicit `discount` when present, otherwise derives it from
    /// `original_price`. Returns `None` when the product is not discounted.
    #[must_use]
    pub fn discount_percent(&self) -> Option<u8> {
        if let Some(pct) = self.discount.filter(|pct| *pct > 0) {
            return Some(pct.min(100));
        }
        let original = self.original_price.filter(|o| *o > self.price && !o.is_zero())?;
        let pct = ((original - self.price) / original * Decimal::ONE_HUNDRED).round();
        pct.to_u8().filter(|p| *p > 0)
    }
}

/// Anything stored in a keyed collection (cart, wishlist).
pub trait Keyed {
    fn key(&self) -> &ItemKey;
}

impl Keyed for Product {
    fn key(&self) -> &ItemKey {
        &self.key
    }
}

/// One page of catalog results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPage {
    pub products: Vec<Product>,
    pub total: u64,
    pub page: u32,
    pub pages: u32,
}

/// Sort order for catalog listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    Newest,
    PriceAsc,
    PriceDesc,
    Name,
    Rating,
}

impl SortOrder {
    /// Query-string value understood by `GET /products`.
    #[must_use]
    pub const fn as_param(self) -> &'static str {
        match self {
            Self::Newest => "newest",
            Self::PriceAsc => "price_asc",
            Self::PriceDesc => "price_desc",
            Self::Name => "name",
            Self::Rating => "rating",
        }
    }
}

impl std::str::FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "newest" => Ok(Self::Newest),
            "price_asc" | "price-asc" => Ok(Self::PriceAsc),
            "price_desc" | "price-desc" => Ok(Self::PriceDesc),
            "name" => Ok(Self::Name),
            "rating" => Ok(Self::Rating),
            _ => Err(format!("invalid sort order: {s}")),
        }
    }
}

/// Search, filter and sort parameters for the catalog listing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct ProductQuery {
    pub search: Option<String>,
    pub category: Option<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub in_stock: bool,
    pub sort: SortOrder,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl ProductQuery {
    /// Check the query before it is sent.
    ///
    /// # Errors
    ///
    /// Rejects negative prices, `min_price > max_price`, and a zero page or
    /// limit.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(min) = self.min_price {
            crate::validation::non_negative("minimum price", min)?;
        }
        if let Some(max) = self.max_price {
            crate::validation::non_negative("maximum price", max)?;
        }
        if let (Some(min), Some(max)) = (self.min_price, self.max_price)
            && min > max
        {
            return Err(ValidationError::PriceRange { min, max });
        }
        if self.page == Some(0) {
            return Err(ValidationError::Zero("page"));
        }
        if self.limit == Some(0) {
            return Err(ValidationError::Zero("limit"));
        }
        Ok(())
    }

    /// Query-string pairs, omitting unset filters and blank text.
    #[must_use]
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(search) = crate::validation::optional(self.search.as_deref()) {
            pairs.push(("search", search));
        }
        if let Some(category) = crate::validation::optional(self.category.as_deref()) {
            pairs.push(("category", category));
        }
        if let Some(min) = self.min_price {
            pairs.push(("minPrice", min.to_string()));
        }
        if let Some(max) = self.max_price {
            pairs.push(("maxPrice", max.to_string()));
        }
        if self.in_stock {
            pairs.push(("inStock", "true".to_string()));
        }
        pairs.push(("sort", self.sort.as_param().to_string()));
        if let Some(page) = self.page {
            pairs.push(("page", page.to_string()));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit", limit.to_string()));
        }
        pairs
    }
}

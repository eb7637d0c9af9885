//! Cache types for catalog responses.

use paperclip_core::{Product, ProductId, ProductPage, ProductQuery};

/// Cache key for catalog pages and single products.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum CacheKey {
    Product(ProductId),
    Products(ProductQuery),
    Categories,
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Product(Box<Product>),
    Products(ProductPage),
    Categories(Vec<String>),
}

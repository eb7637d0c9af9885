//! Wishlist: a set of products in insertion order.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::catalog::{Keyed, Product};
use crate::types::{ItemKey, ProductId};

/// Saved products. Membership only, no quantities.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Wishlist {
    items: Vec<Product>,
}

impl Wishlist {
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Build a wishlist keeping the first occurrence of each key.
    #[must_use]
    pub fn from_items(items: impl IntoIterator<Item = Product>) -> Self {
        let mut list = Self::new();
        for product in items {
            list.add(product);
        }
        list
    }

    #[must_use]
    pub fn items(&self) -> &[Product] {
        &self.items
    }

    #[must_use]
    pub fn contains(&self, key: &ItemKey) -> bool {
        self.items.iter().any(|p| p.key() == key)
    }

    /// Add a product. Returns `false` if it was already saved.
    pub fn add(&mut self, product: Product) -> bool {
        if self.contains(&product.key) {
            return false;
        }
        self.items.push(product);
        true
    }

    /// Add when absent, remove when present. Returns `true` if the product
    /// is saved afterwards.
    pub fn toggle(&mut self, product: Product) -> bool {
        if self.remove(&product.key).is_some() {
            false
        } else {
            self.items.push(product);
            true
        }
    }

    pub fn remove(&mut self, key: &ItemKey) -> Option<Product> {
        let idx = self.items.iter().position(|p| p.key() == key)?;
        Some(self.items.remove(idx))
    }

    /// Drop every product whose server id is in `deleted`.
    pub fn remove_products(&mut self, deleted: &HashSet<ProductId>) -> usize {
        let before = self.items.len();
        self.items
            .retain(|p| p.server_id().is_none_or(|id| !deleted.contains(id)));
        before - self.items.len()
    }

    #[must_use]
    pub fn server_ids(&self) -> Vec<ProductId> {
        self.items
            .iter()
            .filter_map(|p| p.server_id().cloned())
            .collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    fn product(id: &str) -> Product {
        let mut p = Product::sample(id, "Paper", Decimal::TEN);
        p.key = ItemKey::server(ProductId::new(id));
        p
    }

    #[test]
    fn test_add_is_idempotent() {
        let mut list = Wishlist::new();
        assert!(list.add(product("a")));
        assert!(!list.add(product("a")));
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn test_toggle() {
        let mut list = Wishlist::new();
        assert!(list.toggle(product("a")));
        assert!(!list.toggle(product("a")));
        assert!(list.is_empty());
    }

    #[test]
    fn test_from_items_keeps_first() {
        let mut second = product("a");
        second.name = "Renamed".to_string();
        let list = Wishlist::from_items([product("a"), product("b"), second]);
        assert_eq!(list.len(), 2);
        assert_eq!(list.items().first().map(|p| p.name.as_str()), Some("a"));
    }

    #[test]
    fn test_remove_products_skips_local() {
        let mut list = Wishlist::from_items([
            product("a"),
            product("b"),
            Product::sample("demo", "Paper", Decimal::ONE),
        ]);
        let deleted: HashSet<ProductId> = [ProductId::new("a")].into_iter().collect();
        assert_eq!(list.remove_products(&deleted), 1);
        assert_eq!(list.len(), 2);
        assert_eq!(list.server_ids(), vec![ProductId::new("b")]);
    }
}

//! Cart contents and quantity rules.
//!
//! The cart is an ordered list keyed by [`ItemKey`]. It never holds two
//! entries for the same key and never holds an entry with quantity zero.

use std::collections::HashSet;
use std::num::NonZeroU32;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::catalog::{Keyed, Product};
use crate::types::{ItemKey, ProductId};

/// A product plus a quantity of at least one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    #[serde(flatten)]
    pub product: Product,
    quantity: NonZeroU32,
}

impl CartItem {
    /// A new line holding one unit.
    #[must_use]
    pub const fn new(product: Product) -> Self {
        Self {
            product,
            quantity: NonZeroU32::MIN,
        }
    }

    #[must_use]
    pub const fn quantity(&self) -> u32 {
        self.quantity.get()
    }

    /// Price × quantity.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.product.price * Decimal::from(self.quantity.get())
    }
}

impl Keyed for CartItem {
    fn key(&self) -> &ItemKey {
        &self.product.key
    }
}

/// Result of [`Cart::add`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    /// A new line was created at quantity 1.
    Inserted,
    /// An existing line went up by one to the contained quantity.
    Incremented(u32),
}

/// Result of a quantity change on an existing key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantityChange {
    /// The quantity is now the contained value.
    Updated(u32),
    /// Already at the minimum of 1; nothing changed.
    AtMinimum,
    /// No line with that key.
    NotFound,
}

impl QuantityChange {
    /// Whether the cart was modified.
    #[must_use]
    pub const fn changed(self) -> bool {
        matches!(self, Self::Updated(_))
    }
}

/// The shopping cart.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Build a cart from possibly-duplicated lines.
    ///
    /// Lines sharing a key are merged into the first occurrence with their
    /// quantities summed.
    #[must_use]
    pub fn from_items(items: impl IntoIterator<Item = CartItem>) -> Self {
        let mut cart = Self::new();
        for item in items {
            match cart.position(item.key()) {
                Some(idx) => {
                    if let Some(existing) = cart.items.get_mut(idx) {
                        existing.quantity = existing.quantity.saturating_add(item.quantity.get());
                    }
                }
                None => cart.items.push(item),
            }
        }
        cart
    }

    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    #[must_use]
    pub fn get(&self, key: &ItemKey) -> Option<&CartItem> {
        self.items.iter().find(|item| item.key() == key)
    }

    #[must_use]
    pub fn contains(&self, key: &ItemKey) -> bool {
        self.position(key).is_some()
    }

    /// Add one unit of `product`.
    ///
    /// An existing line is incremented by exactly one; a new product is
    /// inserted at the end with quantity 1.
    pub fn add(&mut self, product: Product) -> AddOutcome {
        if let Some(item) = self.items.iter_mut().find(|item| item.key() == &product.key) {
            item.quantity = item.quantity.saturating_add(1);
            return AddOutcome::Incremented(item.quantity.get());
        }
        self.items.push(CartItem::new(product));
        AddOutcome::Inserted
    }

    /// Increase the quantity of an existing line by one.
    pub fn increment(&mut self, key: &ItemKey) -> QuantityChange {
        match self.items.iter_mut().find(|item| item.key() == key) {
            Some(item) => {
                item.quantity = item.quantity.saturating_add(1);
                QuantityChange::Updated(item.quantity.get())
            }
            None => QuantityChange::NotFound,
        }
    }

    /// Decrease the quantity of an existing line by one.
    ///
    /// At quantity 1 this is a no-op: removal only happens through
    /// [`Cart::remove`].
    pub fn decrement(&mut self, key: &ItemKey) -> QuantityChange {
        let Some(item) = self.items.iter_mut().find(|item| item.key() == key) else {
            return QuantityChange::NotFound;
        };
        match NonZeroU32::new(item.quantity.get() - 1) {
            Some(lower) => {
                item.quantity = lower;
                QuantityChange::Updated(lower.get())
            }
            None => QuantityChange::AtMinimum,
        }
    }

    /// Set an exact quantity. Zero is rejected as [`QuantityChange::AtMinimum`].
    pub fn set_quantity(&mut self, key: &ItemKey, quantity: u32) -> QuantityChange {
        let Some(item) = self.items.iter_mut().find(|item| item.key() == key) else {
            return QuantityChange::NotFound;
        };
        match NonZeroU32::new(quantity) {
            Some(q) => {
                item.quantity = q;
                QuantityChange::Updated(q.get())
            }
            None => QuantityChange::AtMinimum,
        }
    }

    /// Remove a line entirely.
    pub fn remove(&mut self, key: &ItemKey) -> Option<CartItem> {
        let idx = self.position(key)?;
        Some(self.items.remove(idx))
    }

    /// Drop every line whose server id is in `deleted`. Returns how many
    /// lines were removed.
    pub fn remove_products(&mut self, deleted: &HashSet<ProductId>) -> usize {
        let before = self.items.len();
        self.items
            .retain(|item| item.product.server_id().is_none_or(|id| !deleted.contains(id)));
        before - self.items.len()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Server ids of all lines, in cart order. Client-only lines are skipped.
    #[must_use]
    pub fn server_ids(&self) -> Vec<ProductId> {
        self.items
            .iter()
            .filter_map(|item| item.product.server_id().cloned())
            .collect()
    }

    /// Sum of price × quantity over all lines.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.items.iter().map(CartItem::line_total).sum()
    }

    /// Sum of quantities (the badge number).
    #[must_use]
    pub fn count(&self) -> u32 {
        self.items
            .iter()
            .fold(0u32, |acc, item| acc.saturating_add(item.quantity.get()))
    }

    /// Number of distinct lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn position(&self, key: &ItemKey) -> Option<usize> {
        self.items.iter().position(|item| item.key() == key)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn product(id: &str, price: i64) -> Product {
        let mut p = Product::sample(format!("Item {id}"), "Supplies", Decimal::new(price, 0));
        p.key = ItemKey::server(ProductId::new(id));
        p.stock = 10;
        p
    }

    fn key(id: &str) -> ItemKey {
        ItemKey::server(ProductId::new(id))
    }

    #[test]
    fn test_add_same_product_twice_increments() {
        let mut cart = Cart::new();
        assert_eq!(cart.add(product("a", 10)), AddOutcome::Inserted);
        assert_eq!(cart.add(product("a", 10)), AddOutcome::Incremented(2));
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.get(&key("a")).unwrap().quantity(), 2);
    }

    #[test]
    fn test_decrement_at_one_is_noop() {
        let mut cart = Cart::new();
        cart.add(product("a", 10));
        assert_eq!(cart.decrement(&key("a")), QuantityChange::AtMinimum);
        assert_eq!(cart.get(&key("a")).unwrap().quantity(), 1);
        assert_eq!(cart.len(), 1);
    }

    #[test]
    fn test_decrement_above_one() {
        let mut cart = Cart::new();
        cart.add(product("a", 10));
        cart.increment(&key("a"));
        cart.increment(&key("a"));
        assert_eq!(cart.decrement(&key("a")), QuantityChange::Updated(2));
    }

    #[test]
    fn test_unknown_key() {
        let mut cart = Cart::new();
        assert_eq!(cart.increment(&key("x")), QuantityChange::NotFound);
        assert_eq!(cart.decrement(&key("x")), QuantityChange::NotFound);
        assert!(cart.remove(&key("x")).is_none());
    }

    #[test]
    fn test_set_quantity_rejects_zero() {
        let mut cart = Cart::new();
        cart.add(product("a", 10));
        assert_eq!(cart.set_quantity(&key("a"), 0), QuantityChange::AtMinimum);
        assert_eq!(cart.set_quantity(&key("a"), 7), QuantityChange::Updated(7));
        assert_eq!(cart.count(), 7);
    }

    #[test]
    fn test_total_and_count() {
        let mut cart = Cart::new();
        cart.add(product("a", 100));
        cart.add(product("a", 100));
        cart.add(product("b", 50));
        assert_eq!(cart.total(), Decimal::new(250, 0));
        assert_eq!(cart.count(), 3);
        assert_eq!(cart.len(), 2);
    }

    #[test]
    fn test_remove_products() {
        let mut cart = Cart::new();
        cart.add(product("a", 1));
        cart.add(product("b", 1));
        cart.add(product("c", 1));
        cart.add(Product::sample("Demo", "Supplies", Decimal::ONE));

        let deleted: HashSet<ProductId> = [ProductId::new("b")].into_iter().collect();
        assert_eq!(cart.remove_products(&deleted), 1);
        assert_eq!(cart.server_ids(), vec![ProductId::new("a"), ProductId::new("c")]);
        assert_eq!(cart.len(), 3);
    }

    #[test]
    fn test_from_items_merges_duplicates() {
        let mut a = CartItem::new(product("a", 5));
        a.quantity = NonZeroU32::new(2).unwrap();
        let cart = Cart::from_items([a, CartItem::new(product("b", 5)), CartItem::new(product("a", 5))]);
        assert_eq!(cart.len(), 2);
        assert_eq!(cart.get(&key("a")).unwrap().quantity(), 3);
        assert_eq!(cart.items().first().unwrap().key(), &key("a"));
    }

    #[test]
    fn test_zero_quantity_rejected_on_deserialize() {
        let json = r#"[{"id": "a", "name": "A", "category": "c", "price": "1", "quantity": 0}]"#;
        assert!(serde_json::from_str::<Cart>(json).is_err());
    }

    #[test]
    fn test_serialized_shape() {
        let mut cart = Cart::new();
        cart.add(product("a", 3));
        let json = serde_json::to_value(&cart).unwrap();
        let first = json.as_array().unwrap().first().unwrap();
        assert_eq!(first["id"], "a");
        assert_eq!(first["quantity"], 1);
    }
}

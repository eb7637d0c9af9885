//! Application state with named mutations.
//!
//! `ShopState` owns the cart, wishlist, session and pending notices. Every
//! mutation goes through a method here, and each method that changes a list
//! saves that list through [`Persistence`] before returning.

use std::collections::HashSet;

use paperclip_core::account::User;
use paperclip_core::{AddOutcome, Cart, CartItem, ItemKey, Product, ProductId, QuantityChange, Wishlist};
use secrecy::SecretString;
use tracing::debug;

use crate::error::{add_breadcrumb, clear_sentry_user, set_sentry_user};
use crate::persist::Persistence;
use crate::reconcile::{ListKind, RemovalNotice};
use crate::session::SessionState;

/// Client-side application state.
#[derive(Debug)]
pub struct ShopState {
    persistence: Persistence,
    cart: Cart,
    wishlist: Wishlist,
    session: SessionState,
    cart_notice: Option<RemovalNotice>,
    wishlist_notice: Option<RemovalNotice>,
}

impl ShopState {
    /// Load the cart and wishlist. The session starts signed out; see
    /// [`crate::session::Bootstrap`].
    #[must_use]
    pub fn load(persistence: Persistence) -> Self {
        let cart = persistence.load_cart();
        let wishlist = persistence.load_wishlist();
        debug!(cart = cart.len(), wishlist = wishlist.len(), "Loaded local state");
        Self {
            persistence,
            cart,
            wishlist,
            session: SessionState::SignedOut,
            cart_notice: None,
            wishlist_notice: None,
        }
    }

    #[must_use]
    pub const fn cart(&self) -> &Cart {
        &self.cart
    }

    #[must_use]
    pub const fn wishlist(&self) -> &Wishlist {
        &self.wishlist
    }

    #[must_use]
    pub const fn session(&self) -> &SessionState {
        &self.session
    }

    #[must_use]
    pub const fn persistence(&self) -> &Persistence {
        &self.persistence
    }

    // =========================================================================
    // Cart
    // =========================================================================

    pub fn add_to_cart(&mut self, product: Product) -> AddOutcome {
        let key = product.key.to_string();
        let outcome = self.cart.add(product);
        add_breadcrumb("cart", "Added to cart", Some(&[("item", key.as_str())]));
        self.persistence.save_cart(&self.cart);
        outcome
    }

    pub fn increment_quantity(&mut self, key: &ItemKey) -> QuantityChange {
        let change = self.cart.increment(key);
        self.save_cart_if(change.changed());
        change
    }

    /// Decrease by one. An item at quantity 1 stays in the cart.
    pub fn decrement_quantity(&mut self, key: &ItemKey) -> QuantityChange {
        let change = self.cart.decrement(key);
        self.save_cart_if(change.changed());
        change
    }

    /// Set an explicit quantity. Zero is refused with `AtMinimum`.
    pub fn set_quantity(&mut self, key: &ItemKey, quantity: u32) -> QuantityChange {
        let change = self.cart.set_quantity(key, quantity);
        self.save_cart_if(change.changed());
        change
    }

    pub fn remove_from_cart(&mut self, key: &ItemKey) -> Option<CartItem> {
        let removed = self.cart.remove(key);
        if removed.is_some() {
            add_breadcrumb("cart", "Removed from cart", Some(&[("item", key.to_string().as_str())]));
            self.persistence.save_cart(&self.cart);
        }
        removed
    }

    pub fn clear_cart(&mut self) {
        self.cart.clear();
        self.persistence.save_cart(&self.cart);
    }

    fn save_cart_if(&self, changed: bool) {
        if changed {
            self.persistence.save_cart(&self.cart);
        }
    }

    // =========================================================================
    // Wishlist
    // =========================================================================

    /// Add if absent. Returns `false` if the product was already listed.
    pub fn add_to_wishlist(&mut self, product: Product) -> bool {
        let added = self.wishlist.add(product);
        if added {
            self.persistence.save_wishlist(&self.wishlist);
        }
        added
    }

    /// Add if absent, remove if present. Returns whether it is now listed.
    pub fn toggle_wishlist(&mut self, product: Product) -> bool {
        let key = product.key.to_string();
        let listed = self.wishlist.toggle(product);
        let message = if listed { "Added to wishlist" } else { "Removed from wishlist" };
        add_breadcrumb("wishlist", message, Some(&[("item", key.as_str())]));
        self.persistence.save_wishlist(&self.wishlist);
        listed
    }

    pub fn remove_from_wishlist(&mut self, key: &ItemKey) -> Option<Product> {
        let removed = self.wishlist.remove(key);
        if removed.is_some() {
            self.persistence.save_wishlist(&self.wishlist);
        }
        removed
    }

    /// Move a wishlist entry into the cart.
    pub fn move_to_cart(&mut self, key: &ItemKey) -> Option<AddOutcome> {
        let product = self.wishlist.remove(key)?;
        self.persistence.save_wishlist(&self.wishlist);
        Some(self.add_to_cart(product))
    }

    // =========================================================================
    // Reconciliation
    // =========================================================================

    /// Remove deleted products from one list and raise a notice if any went.
    pub fn drop_deleted(&mut self, list: ListKind, deleted: &HashSet<ProductId>) -> usize {
        if deleted.is_empty() {
            return 0;
        }
        let removed = match list {
            ListKind::Cart => self.cart.remove_products(deleted),
            ListKind::Wishlist => self.wishlist.remove_products(deleted),
        };
        if removed == 0 {
            return 0;
        }
        let notice = Some(RemovalNotice { list, removed });
        match list {
            ListKind::Cart => {
                self.persistence.save_cart(&self.cart);
                self.cart_notice = notice;
            }
            ListKind::Wishlist => {
                self.persistence.save_wishlist(&self.wishlist);
                self.wishlist_notice = notice;
            }
        }
        removed
    }

    /// Take the pending removal notice for a list. Returns it once.
    pub fn take_notice(&mut self, list: ListKind) -> Option<RemovalNotice> {
        match list {
            ListKind::Cart => self.cart_notice.take(),
            ListKind::Wishlist => self.wishlist_notice.take(),
        }
    }

    // =========================================================================
    // Session
    // =========================================================================

    /// Record a fresh sign-in and persist its token and user.
    pub fn sign_in(&mut self, token: &SecretString, user: User) {
        self.persistence.save_session(token, &user);
        set_sentry_user(&user.id, Some(&user.email));
        self.session = SessionState::Confirmed(user);
    }

    /// Adopt the outcome of a bootstrap or profile refresh.
    pub fn set_session(&mut self, session: SessionState) {
        match &session {
            SessionState::Confirmed(user) => {
                set_sentry_user(&user.id, Some(&user.email));
                self.persistence.save_user(user);
            }
            SessionState::Tentative(_) => {}
            SessionState::SignedOut => clear_sentry_user(),
        }
        self.session = session;
    }

    /// Forget the session in memory and in storage. Lists are kept.
    pub fn sign_out(&mut self) {
        self.persistence.clear_session();
        clear_sentry_user();
        self.session = SessionState::SignedOut;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use paperclip_core::UserId;
    use rust_decimal::Decimal;

    use super::*;
    use crate::storage::{MemoryStorage, Storage, StorageKey};

    fn product(id: &str, price: i64) -> Product {
        let mut product = Product::sample(id.to_uppercase(), "Paper", Decimal::new(price, 0));
        product.key = ItemKey::server(ProductId::new(id));
        product.stock = 10;
        product
    }

    fn setup() -> (Arc<MemoryStorage>, ShopState) {
        let storage = Arc::new(MemoryStorage::new());
        let state = ShopState::load(Persistence::new(storage.clone()));
        (storage, state)
    }

    fn reload(storage: &Arc<MemoryStorage>) -> ShopState {
        ShopState::load(Persistence::new(storage.clone()))
    }

    #[test]
    fn test_add_twice_persists_quantity_two() {
        let (storage, mut state) = setup();
        assert_eq!(state.add_to_cart(product("a", 100)), AddOutcome::Inserted);
        assert_eq!(state.add_to_cart(product("a", 100)), AddOutcome::Incremented(2));

        let reloaded = reload(&storage);
        assert_eq!(reloaded.cart().len(), 1);
        assert_eq!(reloaded.cart().count(), 2);
    }

    #[test]
    fn test_totals() {
        let (_, mut state) = setup();
        state.add_to_cart(product("a", 100));
        state.add_to_cart(product("a", 100));
        state.add_to_cart(product("b", 50));
        assert_eq!(state.cart().total(), Decimal::new(250, 0));
        assert_eq!(state.cart().count(), 3);
        assert_eq!(state.cart().len(), 2);
    }

    #[test]
    fn test_decrement_at_one_is_noop() {
        let (_, mut state) = setup();
        state.add_to_cart(product("a", 1));
        let key = ItemKey::server(ProductId::new("a"));
        assert_eq!(state.decrement_quantity(&key), QuantityChange::AtMinimum);
        assert_eq!(state.cart().get(&key).unwrap().quantity(), 1);
    }

    #[test]
    fn test_set_quantity_zero_refused() {
        let (_, mut state) = setup();
        state.add_to_cart(product("a", 1));
        let key = ItemKey::server(ProductId::new("a"));
        assert_eq!(state.set_quantity(&key, 0), QuantityChange::AtMinimum);
        assert_eq!(state.set_quantity(&key, 4), QuantityChange::Updated(4));
        assert_eq!(state.cart().count(), 4);
    }

    #[test]
    fn test_move_to_cart() {
        let (storage, mut state) = setup();
        state.toggle_wishlist(product("a", 5));
        let key = ItemKey::server(ProductId::new("a"));

        assert_eq!(state.move_to_cart(&key), Some(AddOutcome::Inserted));
        assert!(state.wishlist().is_empty());

        let reloaded = reload(&storage);
        assert!(reloaded.wishlist().is_empty());
        assert!(reloaded.cart().contains(&key));
    }

    #[test]
    fn test_local_items_not_persisted() {
        let (storage, mut state) = setup();
        state.add_to_cart(Product::sample("Demo", "Paper", Decimal::ONE));
        assert_eq!(state.cart().len(), 1);
        assert!(reload(&storage).cart().is_empty());
    }

    #[test]
    fn test_drop_deleted_without_match_raises_no_notice() {
        let (_, mut state) = setup();
        state.add_to_cart(product("a", 1));
        let deleted: HashSet<_> = [ProductId::new("zzz")].into_iter().collect();
        assert_eq!(state.drop_deleted(ListKind::Cart, &deleted), 0);
        assert!(state.take_notice(ListKind::Cart).is_none());
    }

    #[test]
    fn test_sign_in_and_out() {
        let (storage, mut state) = setup();
        let user = User {
            id: UserId::new("u1"),
            email: "ada@example.com".to_string(),
            name: "Ada".to_string(),
            is_admin: false,
            phone: None,
            avatar: None,
        };
        state.add_to_cart(product("a", 1));
        state.sign_in(&SecretString::from("tok"), user.clone());
        assert_eq!(state.session(), &SessionState::Confirmed(user));
        assert_eq!(storage.get(StorageKey::Token).unwrap().as_deref(), Some("tok"));

        state.sign_out();
        assert_eq!(state.session(), &SessionState::SignedOut);
        assert_eq!(storage.get(StorageKey::Token).unwrap(), None);
        assert_eq!(storage.get(StorageKey::User).unwrap(), None);
        assert_eq!(state.cart().len(), 1);
    }
}

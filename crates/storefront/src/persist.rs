//! The single boundary between in-memory state and [`Storage`].
//!
//! Loads happen once at startup; every state mutation saves the list it
//! touched. Only items with a server identity are ever written.
//!
//! Writes are best-effort: a failing store is logged and the in-memory state
//! stays authoritative. A value that cannot be decoded is logged, removed,
//! and treated as absent.

use std::sync::Arc;

use paperclip_core::account::User;
use paperclip_core::{Cart, CartItem, Keyed, Product, Wishlist};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::storage::{Storage, StorageKey};

/// Typed access to the persisted token, user, cart and wishlist.
#[derive(Clone)]
pub struct Persistence {
    storage: Arc<dyn Storage>,
}

impl std::fmt::Debug for Persistence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Persistence").finish_non_exhaustive()
    }
}

/// Whether an item may be written to storage or sent to the server.
fn persistable<T: Keyed>(item: &T) -> bool {
    item.key().is_server()
}

impl Persistence {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    // =========================================================================
    // Session
    // =========================================================================

    #[must_use]
    pub fn load_token(&self) -> Option<SecretString> {
        self.read_raw(StorageKey::Token)
            .filter(|raw| !raw.trim().is_empty())
            .map(|raw| SecretString::from(raw.trim().to_string()))
    }

    #[must_use]
    pub fn load_user(&self) -> Option<User> {
        self.load_json(StorageKey::User)
    }

    pub fn save_session(&self, token: &SecretString, user: &User) {
        self.write_raw(StorageKey::Token, token.expose_secret());
        self.save_user(user);
    }

    pub fn save_user(&self, user: &User) {
        self.save_json(StorageKey::User, user);
    }

    /// Remove the stored token and user.
    pub fn clear_session(&self) {
        self.remove(StorageKey::Token);
        self.remove(StorageKey::User);
    }

    // =========================================================================
    // Lists
    // =========================================================================

    #[must_use]
    pub fn load_cart(&self) -> Cart {
        let items: Vec<CartItem> = self.load_json(StorageKey::Cart).unwrap_or_default();
        Cart::from_items(items.into_iter().filter(persistable))
    }

    pub fn save_cart(&self, cart: &Cart) {
        let items: Vec<&CartItem> = cart.items().iter().filter(|i| persistable(*i)).collect();
        self.save_json(StorageKey::Cart, &items);
    }

    #[must_use]
    pub fn load_wishlist(&self) -> Wishlist {
        let items: Vec<Product> = self.load_json(StorageKey::Wishlist).unwrap_or_default();
        Wishlist::from_items(items.into_iter().filter(persistable))
    }

    pub fn save_wishlist(&self, wishlist: &Wishlist) {
        let items: Vec<&Product> = wishlist.items().iter().filter(|p| persistable(*p)).collect();
        self.save_json(StorageKey::Wishlist, &items);
    }

    // =========================================================================
    // Helper Functions
    // =========================================================================

    fn read_raw(&self, key: StorageKey) -> Option<String> {
        match self.storage.get(key) {
            Ok(value) => value,
            Err(e) => {
                warn!(key = %key, error = %e, "Failed to read stored value");
                None
            }
        }
    }

    fn write_raw(&self, key: StorageKey, value: &str) {
        if let Err(e) = self.storage.set(key, value) {
            warn!(key = %key, error = %e, "Failed to persist value");
        }
    }

    fn remove(&self, key: StorageKey) {
        if let Err(e) = self.storage.remove(key) {
            warn!(key = %key, error = %e, "Failed to remove stored value");
        }
    }

    fn load_json<T: DeserializeOwned>(&self, key: StorageKey) -> Option<T> {
        let raw = self.read_raw(key)?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(key = %key, error = %e, "Discarding corrupted stored value");
                self.remove(key);
                None
            }
        }
    }

    fn save_json<T: Serialize + ?Sized>(&self, key: StorageKey, value: &T) {
        match serde_json::to_string(value) {
            Ok(json) => {
                self.write_raw(key, &json);
                debug!(key = %key, bytes = json.len(), "Persisted value");
            }
            Err(e) => warn!(key = %key, error = %e, "Failed to encode value for storage"),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use paperclip_core::{ItemKey, ProductId, UserId};
    use rust_decimal::Decimal;

    use super::*;
    use crate::storage::MemoryStorage;

    fn server_product(id: &str, price: i64) -> Product {
        let mut product = Product::sample(format!("Item {id}"), "Paper", Decimal::new(price, 0));
        product.key = ItemKey::server(ProductId::new(id));
        product.stock = 10;
        product
    }

    fn setup() -> (Arc<MemoryStorage>, Persistence) {
        let storage = Arc::new(MemoryStorage::new());
        let persistence = Persistence::new(storage.clone());
        (storage, persistence)
    }

    #[test]
    fn test_only_server_items_are_written() {
        let (storage, persistence) = setup();
        let mut cart = Cart::new();
        cart.add(server_product("a", 5));
        cart.add(Product::sample("Demo stapler", "Staplers", Decimal::ONE));
        persistence.save_cart(&cart);

        let raw = storage.get(StorageKey::Cart).unwrap().unwrap();
        let stored: Vec<serde_json::Value> = serde_json::from_str(&raw).unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0]["id"], "a");

        let loaded = persistence.load_cart();
        assert_eq!(loaded.server_ids(), vec![ProductId::new("a")]);
    }

    #[test]
    fn test_wishlist_roundtrip_filters_local() {
        let (_, persistence) = setup();
        let mut wishlist = Wishlist::new();
        wishlist.add(server_product("a", 5));
        wishlist.add(Product::sample("Demo", "Paper", Decimal::ONE));
        persistence.save_wishlist(&wishlist);
        assert_eq!(persistence.load_wishlist().len(), 1);
    }

    #[test]
    fn test_corrupted_value_is_removed() {
        let (storage, persistence) = setup();
        storage.set(StorageKey::Cart, "{not json").unwrap();
        assert!(persistence.load_cart().is_empty());
        assert_eq!(storage.get(StorageKey::Cart).unwrap(), None);
    }

    #[test]
    fn test_session_roundtrip_and_clear() {
        let (storage, persistence) = setup();
        let user = User {
            id: UserId::new("u1"),
            email: "ada@example.com".to_string(),
            name: "Ada".to_string(),
            is_admin: false,
            phone: None,
            avatar: None,
        };
        persistence.save_session(&SecretString::from("tok"), &user);
        assert_eq!(persistence.load_token().unwrap().expose_secret(), "tok");
        assert_eq!(persistence.load_user(), Some(user));

        persistence.clear_session();
        assert!(persistence.load_token().is_none());
        assert_eq!(storage.get(StorageKey::User).unwrap(), None);
    }

    #[test]
    fn test_blank_token_is_absent() {
        let (storage, persistence) = setup();
        storage.set(StorageKey::Token, "  ").unwrap();
        assert!(persistence.load_token().is_none());
    }
}

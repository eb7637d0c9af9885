//! Reconciling locally held products with the catalog.
//!
//! Carts and wishlists live on the client and may outlive the products they
//! reference. On each visit the server identities are checked in one batched
//! request and deleted ones are dropped.
//!
//! Reconciliation fails open: if the check cannot be made, the list is left
//! as it is.

use std::collections::HashSet;
use std::fmt;
use std::future::Future;

use paperclip_core::ProductId;
use tracing::{info, instrument, warn};

use crate::api::{ApiClient, ApiError};
use crate::state::ShopState;

/// Answers which product ids no longer exist.
pub trait ProductDirectory {
    fn find_deleted(
        &self,
        ids: &[ProductId],
    ) -> impl Future<Output = Result<HashSet<ProductId>, ApiError>> + Send;
}

impl ProductDirectory for ApiClient {
    async fn find_deleted(&self, ids: &[ProductId]) -> Result<HashSet<ProductId>, ApiError> {
        self.deleted_products(ids).await
    }
}

/// Which local list a reconciliation touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListKind {
    Cart,
    Wishlist,
}

impl fmt::Display for ListKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Cart => "cart",
            Self::Wishlist => "wishlist",
        })
    }
}

/// Dismissible notice shown after unavailable items were dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemovalNotice {
    pub list: ListKind,
    pub removed: usize,
}

impl fmt::Display for RemovalNotice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (noun, reason) = if self.removed == 1 {
            ("item was", "it is")
        } else {
            ("items were", "they are")
        };
        write!(
            f,
            "{} {noun} removed from your {} because {reason} no longer available.",
            self.removed, self.list
        )
    }
}

/// Check the given ids against the directory.
///
/// Returns `Ok(None)` when the check failed and the list should be kept.
/// Only [`ApiError::SessionExpired`] is propagated so the caller can tear
/// the session down.
async fn check<D>(directory: &D, list: ListKind, ids: &[ProductId]) -> Result<Option<HashSet<ProductId>>, ApiError>
where
    D: ProductDirectory + Sync,
{
    if ids.is_empty() {
        return Ok(Some(HashSet::new()));
    }
    match directory.find_deleted(ids).await {
        Ok(deleted) => Ok(Some(deleted)),
        Err(ApiError::SessionExpired) => Err(ApiError::SessionExpired),
        Err(e) => {
            warn!(list = %list, error = %e, "Product validity check failed, keeping list");
            Ok(None)
        }
    }
}

/// Drop deleted products from the cart. Returns how many entries went.
///
/// # Errors
///
/// Returns [`ApiError::SessionExpired`] if the server rejected the session;
/// every other failure leaves the cart unchanged and returns `Ok(0)`.
#[instrument(skip_all, fields(items = state.cart().len()))]
pub async fn reconcile_cart<D>(directory: &D, state: &mut ShopState) -> Result<usize, ApiError>
where
    D: ProductDirectory + Sync,
{
    let ids = state.cart().server_ids();
    let Some(deleted) = check(directory, ListKind::Cart, &ids).await? else {
        return Ok(0);
    };
    let removed = state.drop_deleted(ListKind::Cart, &deleted);
    if removed > 0 {
        info!(removed, "Removed unavailable products from cart");
    }
    Ok(removed)
}

/// Drop deleted products from the wishlist. Returns how many entries went.
///
/// # Errors
///
/// Returns [`ApiError::SessionExpired`] if the server rejected the session;
/// every other failure leaves the wishlist unchanged and returns `Ok(0)`.
#[instrument(skip_all, fields(items = state.wishlist().len()))]
pub async fn reconcile_wishlist<D>(directory: &D, state: &mut ShopState) -> Result<usize, ApiError>
where
    D: ProductDirectory + Sync,
{
    let ids = state.wishlist().server_ids();
    let Some(deleted) = check(directory, ListKind::Wishlist, &ids).await? else {
        return Ok(0);
    };
    let removed = state.drop_deleted(ListKind::Wishlist, &deleted);
    if removed > 0 {
        info!(removed, "Removed unavailable products from wishlist");
    }
    Ok(removed)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use paperclip_core::{ItemKey, Product};
    use rust_decimal::Decimal;

    use super::*;
    use crate::persist::Persistence;
    use crate::storage::MemoryStorage;

    enum Answer {
        Deleted(Vec<&'static str>),
        Fail,
        Expired,
    }

    struct FakeDirectory {
        answer: Answer,
        calls: AtomicUsize,
    }

    impl FakeDirectory {
        fn new(answer: Answer) -> Self {
            Self {
                answer,
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl ProductDirectory for FakeDirectory {
        async fn find_deleted(&self, _ids: &[ProductId]) -> Result<HashSet<ProductId>, ApiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.answer {
                Answer::Deleted(ids) => Ok(ids.iter().map(|id| ProductId::new(*id)).collect()),
                Answer::Fail => Err(ApiError::Api {
                    status: 503,
                    message: "Service Unavailable".to_string(),
                }),
                Answer::Expired => Err(ApiError::SessionExpired),
            }
        }
    }

    fn product(id: &str) -> Product {
        let mut product = Product::sample(id.to_uppercase(), "Paper", Decimal::new(10, 0));
        product.key = ItemKey::server(ProductId::new(id));
        product.stock = 5;
        product
    }

    fn state_with_cart(ids: &[&str]) -> ShopState {
        let mut state = ShopState::load(Persistence::new(Arc::new(MemoryStorage::new())));
        for id in ids {
            state.add_to_cart(product(id));
        }
        state
    }

    #[tokio::test]
    async fn test_deleted_item_removed() {
        let directory = FakeDirectory::new(Answer::Deleted(vec!["b"]));
        let mut state = state_with_cart(&["a", "b", "c"]);

        let removed = reconcile_cart(&directory, &mut state).await.unwrap();

        assert_eq!(removed, 1);
        assert_eq!(
            state.cart().server_ids(),
            vec![ProductId::new("a"), ProductId::new("c")]
        );
        let notice = state.take_notice(ListKind::Cart).unwrap();
        assert_eq!(notice.removed, 1);
        assert!(state.take_notice(ListKind::Cart).is_none());
    }

    #[tokio::test]
    async fn test_failure_keeps_list() {
        let directory = FakeDirectory::new(Answer::Fail);
        let mut state = state_with_cart(&["a", "b", "c"]);

        let removed = reconcile_cart(&directory, &mut state).await.unwrap();

        assert_eq!(removed, 0);
        assert_eq!(state.cart().len(), 3);
        assert!(state.take_notice(ListKind::Cart).is_none());
    }

    #[tokio::test]
    async fn test_empty_list_makes_no_request() {
        let directory = FakeDirectory::new(Answer::Deleted(vec!["a"]));
        let mut state = state_with_cart(&[]);
        state.add_to_cart(Product::sample("Demo", "Paper", Decimal::ONE));

        assert_eq!(reconcile_cart(&directory, &mut state).await.unwrap(), 0);
        assert_eq!(directory.calls.load(Ordering::SeqCst), 0);
        assert_eq!(state.cart().len(), 1);
    }

    #[tokio::test]
    async fn test_session_expiry_propagates() {
        let directory = FakeDirectory::new(Answer::Expired);
        let mut state = state_with_cart(&["a"]);
        let err = reconcile_cart(&directory, &mut state).await.unwrap_err();
        assert!(matches!(err, ApiError::SessionExpired));
        assert_eq!(state.cart().len(), 1);
    }

    #[tokio::test]
    async fn test_wishlist_reconciled_separately() {
        let directory = FakeDirectory::new(Answer::Deleted(vec!["a"]));
        let mut state = state_with_cart(&["a"]);
        state.toggle_wishlist(product("a"));

        assert_eq!(reconcile_wishlist(&directory, &mut state).await.unwrap(), 1);
        assert!(state.wishlist().is_empty());
        assert_eq!(state.cart().len(), 1);
        assert!(state.take_notice(ListKind::Cart).is_none());
        assert_eq!(
            state.take_notice(ListKind::Wishlist).unwrap().to_string(),
            "1 item was removed from your wishlist because it is no longer available."
        );
    }
}

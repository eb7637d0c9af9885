//! Integration tests for dropping deleted products from cart and wishlist.

#![allow(clippy::unwrap_used)]

use paperclip_core::{Product, ProductId};
use paperclip_integration_tests::MockApi;
use paperclip_storefront::{Shop, StorefrontConfig};
use paperclip_storefront::reconcile::ListKind;
use rust_decimal::Decimal;
use tempfile::TempDir;

async fn setup() -> (MockApi, TempDir, Shop) {
    let api = MockApi::start().await.unwrap();
    let dir = TempDir::new().unwrap();
    let shop = Shop::open(&api.config(dir.path()).unwrap()).unwrap();
    (api, dir, shop)
}

async fn add_to_cart(shop: &mut Shop, id: &ProductId) {
    let product = shop.product(id).await.unwrap();
    shop.state_mut().add_to_cart(product);
}

fn cart_ids(shop: &Shop) -> Vec<ProductId> {
    shop.state().cart().server_ids()
}

// =============================================================================
// Cart
// =============================================================================

#[tokio::test]
async fn test_deleted_product_leaves_cart() {
    let (api, _dir, mut shop) = setup().await;
    let a = api.add_product("A4 Copy Paper", Decimal::new(899, 2), 50);
    let b = api.add_product("Gel Pen", Decimal::new(150, 2), 50);
    let c = api.add_product("Stapler", Decimal::new(1299, 2), 50);
    for id in [&a, &b, &c] {
        add_to_cart(&mut shop, id).await;
    }

    api.remove_product(&b);
    let notice = shop.visit_cart().await.unwrap().unwrap();

    assert_eq!(notice.list, ListKind::Cart);
    assert_eq!(notice.removed, 1);
    assert_eq!(
        notice.to_string(),
        "1 item was removed from your cart because it is no longer available."
    );
    assert_eq!(cart_ids(&shop), vec![a, c]);
}

#[tokio::test]
async fn test_notice_is_shown_once() {
    let (api, _dir, mut shop) = setup().await;
    let a = api.add_product("Binder", Decimal::new(450, 2), 5);
    add_to_cart(&mut shop, &a).await;

    api.remove_product(&a);
    assert!(shop.visit_cart().await.unwrap().is_some());
    assert!(shop.visit_cart().await.unwrap().is_none());
    assert!(shop.state().cart().is_empty());
}

#[tokio::test]
async fn test_reconciled_cart_is_persisted() {
    let (api, dir, mut shop) = setup().await;
    let a = api.add_product("Envelope", Decimal::new(25, 2), 500);
    let b = api.add_product("Label Maker", Decimal::new(3999, 2), 3);
    add_to_cart(&mut shop, &a).await;
    add_to_cart(&mut shop, &b).await;

    api.remove_product(&a);
    shop.visit_cart().await.unwrap();
    drop(shop);

    let reopened = Shop::open(&api.config(dir.path()).unwrap()).unwrap();
    assert_eq!(cart_ids(&reopened), vec![b]);
}

#[tokio::test]
async fn test_failed_check_keeps_cart() {
    let (api, _dir, mut shop) = setup().await;
    let a = api.add_product("Desk Lamp", Decimal::new(2500, 2), 4);
    let b = api.add_product("Monitor Stand", Decimal::new(4500, 2), 2);
    add_to_cart(&mut shop, &a).await;
    add_to_cart(&mut shop, &b).await;

    api.remove_product(&b);
    api.break_validation();

    assert!(shop.visit_cart().await.unwrap().is_none());
    assert_eq!(cart_ids(&shop), vec![a, b]);
}

#[tokio::test]
async fn test_unreachable_api_keeps_cart() {
    let (api, dir, mut shop) = setup().await;
    let a = api.add_product("Paper Tray", Decimal::new(1450, 2), 9);
    let b = api.add_product("Desk Organiser", Decimal::new(2200, 2), 9);
    add_to_cart(&mut shop, &a).await;
    add_to_cart(&mut shop, &b).await;
    drop(shop);

    // Nothing listens on the discard port.
    let offline = StorefrontConfig::for_api("http://127.0.0.1:9/api", dir.path()).unwrap();
    let mut shop = Shop::open(&offline).unwrap();

    assert!(shop.visit_cart().await.unwrap().is_none());
    assert_eq!(cart_ids(&shop), vec![a, b]);
}

#[tokio::test]
async fn test_client_only_items_are_not_checked() {
    let (api, _dir, mut shop) = setup().await;
    shop.state_mut()
        .add_to_cart(Product::sample("Demo Notebook", "Paper", Decimal::new(300, 2)));

    assert!(shop.visit_cart().await.unwrap().is_none());
    assert_eq!(api.hits("POST /api/products/validate"), 0);
    assert_eq!(shop.state().cart().len(), 1);
}

// =============================================================================
// Wishlist
// =============================================================================

#[tokio::test]
async fn test_deleted_products_leave_wishlist() {
    let (api, _dir, mut shop) = setup().await;
    let a = api.add_product("Whiteboard", Decimal::new(8900, 2), 1);
    let b = api.add_product("Markers", Decimal::new(699, 2), 20);
    let c = api.add_product("Eraser", Decimal::new(199, 2), 20);
    for id in [&a, &b, &c] {
        let product = shop.product(id).await.unwrap();
        shop.state_mut().toggle_wishlist(product);
    }

    api.remove_product(&a);
    api.remove_product(&c);
    let notice = shop.visit_wishlist().await.unwrap().unwrap();

    assert_eq!(notice.removed, 2);
    assert_eq!(
        notice.to_string(),
        "2 items were removed from your wishlist because they are no longer available."
    );
    assert_eq!(shop.state().wishlist().server_ids(), vec![b]);
}

#[tokio::test]
async fn test_empty_lists_make_no_request() {
    let (api, _dir, mut shop) = setup().await;

    assert!(shop.visit_cart().await.unwrap().is_none());
    assert!(shop.visit_wishlist().await.unwrap().is_none());
    assert_eq!(api.total_hits(), 0);
}

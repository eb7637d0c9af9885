//! Integration tests for shipping quotes and order placement.

#![allow(clippy::unwrap_used)]

use paperclip_core::account::LoginForm;
use paperclip_core::order::ShippingDetails;
use paperclip_core::{OrderStatus, PaymentMethod, ProductId, ValidationError};
use paperclip_integration_tests::{FREE_SHIPPING_OVER, MockApi, SHIPPING_COST};
use paperclip_storefront::{ApiError, AppError, Shop};
use rust_decimal::Decimal;
use tempfile::TempDir;

async fn signed_in() -> (MockApi, TempDir, Shop) {
    let api = MockApi::start().await.unwrap();
    let dir = TempDir::new().unwrap();
    let mut shop = Shop::open(&api.config(dir.path()).unwrap()).unwrap();
    let _ = api.add_user("Grace", "grace@example.com", "cobol-1959", false);
    shop.login(&LoginForm {
        email: "grace@example.com".to_string(),
        password: "cobol-1959".to_string(),
    })
    .await
    .unwrap();
    (api, dir, shop)
}

async fn add(shop: &mut Shop, id: &ProductId, times: usize) {
    let product = shop.product(id).await.unwrap();
    for _ in 0..times {
        shop.state_mut().add_to_cart(product.clone());
    }
}

fn shipping() -> ShippingDetails {
    ShippingDetails {
        full_name: "Grace Hopper".to_string(),
        phone: "+1 555 010 1959".to_string(),
        address: "7 Harvard Square".to_string(),
        city: "Springfield".to_string(),
        postal_code: Some("02138".to_string()),
        notes: None,
    }
}

// =============================================================================
// Quotes
// =============================================================================

#[tokio::test]
async fn test_quote_adds_shipping() {
    let (api, _dir, mut shop) = signed_in().await;
    let toner = api.add_product("Toner Cartridge", Decimal::new(60, 0), 10);
    add(&mut shop, &toner, 2).await;

    let summary = shop.checkout_quote("Springfield").await.unwrap();

    assert_eq!(summary.subtotal, Decimal::new(120, 0));
    assert_eq!(summary.shipping_cost(), SHIPPING_COST);
    assert_eq!(summary.total, Decimal::new(135, 0));
    assert_eq!(
        summary.shipping.remaining_for_free_shipping(summary.subtotal),
        Some(FREE_SHIPPING_OVER - Decimal::new(120, 0))
    );
}

#[tokio::test]
async fn test_quote_free_shipping_over_threshold() {
    let (api, _dir, mut shop) = signed_in().await;
    let chair = api.add_product("Office Chair", Decimal::new(550, 0), 3);
    add(&mut shop, &chair, 1).await;

    let summary = shop.checkout_quote("Springfield").await.unwrap();

    assert!(summary.shipping.free_shipping);
    assert_eq!(summary.total, Decimal::new(550, 0));
}

#[tokio::test]
async fn test_quote_unserved_city() {
    let (api, _dir, mut shop) = signed_in().await;
    let clips = api.add_product("Paper Clips", Decimal::new(2, 0), 100);
    add(&mut shop, &clips, 1).await;

    let err = shop.checkout_quote("Atlantis").await.unwrap_err();

    assert!(matches!(err, AppError::Api(ApiError::Api { status: 404, .. })));
    assert_eq!(err.user_message(), "We do not deliver to Atlantis yet");
}

// =============================================================================
// Orders
// =============================================================================

#[tokio::test]
async fn test_order_clears_cart() {
    let (api, _dir, mut shop) = signed_in().await;
    let paper = api.add_product("A4 Copy Paper", Decimal::new(9, 0), 40);
    let folder = api.add_product("Folder", Decimal::new(3, 0), 40);
    add(&mut shop, &paper, 3).await;
    add(&mut shop, &folder, 1).await;

    let order = shop
        .place_order(&shipping(), PaymentMethod::CashOnDelivery)
        .await
        .unwrap();

    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.item_count(), 4);
    assert_eq!(order.subtotal, Decimal::new(30, 0));
    assert_eq!(order.total, Decimal::new(30, 0) + SHIPPING_COST);
    assert_eq!(order.shipping.city, "Springfield");
    assert!(shop.state().cart().is_empty());

    let history = shop.my_orders().await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].id, order.id);
}

#[tokio::test]
async fn test_refused_order_keeps_cart() {
    let (api, _dir, mut shop) = signed_in().await;
    let desk = api.add_product("Standing Desk", Decimal::new(420, 0), 2);
    add(&mut shop, &desk, 2).await;
    api.refuse_orders("Only 1 left in stock");

    let err = shop.place_order(&shipping(), PaymentMethod::Card).await.unwrap_err();

    assert_eq!(err.user_message(), "Only 1 left in stock");
    assert_eq!(shop.state().cart().count(), 2);
}

#[tokio::test]
async fn test_invalid_order_makes_no_request() {
    let (api, _dir, mut shop) = signed_in().await;
    let tape = api.add_product("Tape", Decimal::new(2, 0), 1);
    add(&mut shop, &tape, 2).await;

    let err = shop.place_order(&shipping(), PaymentMethod::Card).await.unwrap_err();

    assert!(matches!(
        err,
        AppError::Validation(ValidationError::InsufficientStock { requested: 2, available: 1, .. })
    ));
    assert_eq!(api.hits("POST /api/orders"), 0);
    assert_eq!(shop.state().cart().count(), 2);
}

#[tokio::test]
async fn test_empty_cart_cannot_be_ordered() {
    let (api, _dir, mut shop) = signed_in().await;

    let err = shop.place_order(&shipping(), PaymentMethod::Card).await.unwrap_err();

    assert!(matches!(err, AppError::Validation(ValidationError::EmptyCart)));
    assert_eq!(api.hits("POST /api/orders"), 0);
}

//! Integration tests for sign-in, session bootstrap and expiry.

#![allow(clippy::unwrap_used)]

use paperclip_core::account::LoginForm;
use paperclip_integration_tests::MockApi;
use paperclip_storefront::{ApiError, AppError, SessionState, Shop};
use rust_decimal::Decimal;
use tempfile::TempDir;

async fn setup() -> (MockApi, TempDir, Shop) {
    let api = MockApi::start().await.unwrap();
    let dir = TempDir::new().unwrap();
    let shop = Shop::open(&api.config(dir.path()).unwrap()).unwrap();
    (api, dir, shop)
}

fn reopen(api: &MockApi, dir: &TempDir) -> Shop {
    Shop::open(&api.config(dir.path()).unwrap()).unwrap()
}

fn login_form(email: &str, password: &str) -> LoginForm {
    LoginForm {
        email: email.to_string(),
        password: password.to_string(),
    }
}

// =============================================================================
// Sign-in
// =============================================================================

#[tokio::test]
async fn test_login_confirms_and_persists() {
    let (api, dir, mut shop) = setup().await;
    let ada = api.add_user("Ada", "ada@example.com", "analytical", false);

    let user = shop
        .login(&login_form("ada@example.com", "analytical"))
        .await
        .unwrap();

    assert_eq!(user, ada);
    assert_eq!(shop.session(), &SessionState::Confirmed(ada.clone()));
    assert!(shop.client().has_token());

    let persistence = reopen(&api, &dir).state().persistence().clone();
    assert!(persistence.load_token().is_some());
    assert_eq!(persistence.load_user(), Some(ada));
}

#[tokio::test]
async fn test_wrong_password_is_not_session_expiry() {
    let (api, _dir, mut shop) = setup().await;
    let _ = api.add_user("Ada", "ada@example.com", "analytical", false);

    let err = shop
        .login(&login_form("ada@example.com", "difference"))
        .await
        .unwrap_err();

    match err {
        AppError::Api(ApiError::Api { status, message }) => {
            assert_eq!(status, 401);
            assert_eq!(message, "Invalid email or password");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(shop.session(), &SessionState::SignedOut);
}

#[tokio::test]
async fn test_malformed_login_makes_no_request() {
    let (api, _dir, mut shop) = setup().await;

    let err = shop.login(&login_form("not-an-email", "x")).await.unwrap_err();

    assert!(matches!(err, AppError::Validation(_)));
    assert_eq!(api.total_hits(), 0);
}

// =============================================================================
// Bootstrap
// =============================================================================

#[tokio::test]
async fn test_bootstrap_restores_tentative_then_confirms() {
    let (api, dir, mut shop) = setup().await;
    let ada = api.add_user("Ada", "ada@example.com", "analytical", false);
    shop.login(&login_form("ada@example.com", "analytical"))
        .await
        .unwrap();
    drop(shop);

    let mut shop = reopen(&api, &dir);
    let bootstrap = shop.restore_session();
    assert_eq!(shop.session(), &SessionState::Tentative(ada.clone()));
    assert!(bootstrap.has_token());

    let session = shop.confirm_session(bootstrap).await.clone();
    assert_eq!(session, SessionState::Confirmed(ada));
    assert_eq!(api.hits("GET /api/auth/me"), 1);
}

#[tokio::test]
async fn test_tentative_session_sends_cached_token() {
    let (api, dir, mut shop) = setup().await;
    let ada = api.add_user("Ada", "ada@example.com", "analytical", false);
    shop.login(&login_form("ada@example.com", "analytical"))
        .await
        .unwrap();
    drop(shop);

    let mut shop = reopen(&api, &dir);
    let _bootstrap = shop.restore_session();
    assert!(shop.client().has_token());

    let orders = shop.my_orders().await.unwrap();

    assert!(orders.is_empty());
    assert_eq!(shop.session(), &SessionState::Tentative(ada));
    assert!(shop.state().persistence().load_token().is_some());
}

#[tokio::test]
async fn test_bootstrap_with_rejected_token_signs_out() {
    let (api, dir, mut shop) = setup().await;
    let _ = api.add_user("Ada", "ada@example.com", "analytical", false);
    shop.login(&login_form("ada@example.com", "analytical"))
        .await
        .unwrap();
    drop(shop);
    api.expire_sessions();

    let mut shop = reopen(&api, &dir);
    assert_eq!(shop.bootstrap().await, &SessionState::SignedOut);
    assert!(!shop.client().has_token());

    let persistence = shop.state().persistence();
    assert!(persistence.load_token().is_none());
    assert!(persistence.load_user().is_none());
}

#[tokio::test]
async fn test_bootstrap_without_token_makes_no_request() {
    let (api, _dir, mut shop) = setup().await;

    assert_eq!(shop.bootstrap().await, &SessionState::SignedOut);
    assert_eq!(api.total_hits(), 0);
}

// =============================================================================
// Expiry
// =============================================================================

#[tokio::test]
async fn test_unauthorized_response_tears_session_down() {
    let (api, dir, mut shop) = setup().await;
    let _ = api.add_user("Ada", "ada@example.com", "analytical", false);
    let pen = api.add_product("Fountain Pen", Decimal::new(2450, 2), 8);
    shop.login(&login_form("ada@example.com", "analytical"))
        .await
        .unwrap();
    let product = shop.product(&pen).await.unwrap();
    shop.state_mut().add_to_cart(product);

    api.expire_sessions();
    let err = shop.my_orders().await.unwrap_err();

    assert!(matches!(err, AppError::SessionExpired));
    assert_eq!(shop.session(), &SessionState::SignedOut);
    assert!(!shop.client().has_token());

    // Local lists survive the teardown; the stored session does not.
    let reopened = reopen(&api, &dir);
    assert_eq!(reopened.state().cart().len(), 1);
    assert!(reopened.state().persistence().load_token().is_none());
    assert!(reopened.state().persistence().load_user().is_none());
}

#[tokio::test]
async fn test_logout_keeps_cart() {
    let (api, _dir, mut shop) = setup().await;
    let _ = api.add_user("Ada", "ada@example.com", "analytical", false);
    let pad = api.add_product("Legal Pad", Decimal::new(399, 2), 30);
    shop.login(&login_form("ada@example.com", "analytical"))
        .await
        .unwrap();
    let product = shop.product(&pad).await.unwrap();
    shop.state_mut().add_to_cart(product);

    shop.logout();

    assert_eq!(shop.session(), &SessionState::SignedOut);
    assert_eq!(shop.state().cart().len(), 1);
    assert!(matches!(shop.my_orders().await, Err(AppError::NotSignedIn)));
}

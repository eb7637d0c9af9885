//! Integration tests for the Paperclip storefront client.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p paperclip-integration-tests
//! ```
//!
//! Each test starts its own [`MockApi`]: an in-process axum server on an
//! ephemeral port speaking the storefront's `{ success, data, message }`
//! envelope. Tests seed it, point a `Shop` at it, and inspect both sides.
//!
//! # Test Categories
//!
//! - `catalog` - Listing, caching, query validation, admin gating
//! - `reconciliation` - Dropping deleted products from cart and wishlist
//! - `session` - Bootstrap, sign-in persistence, 401 teardown
//! - `checkout` - Quotes and order placement

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::collections::{HashMap, HashSet};
use std::net::SocketAddr;
use std::path::Path as FsPath;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use axum::extract::{Path, Query, Request, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use paperclip_core::account::User;
use paperclip_core::{ItemKey, Product, ProductId, UserId};
use paperclip_storefront::StorefrontConfig;
use paperclip_storefront::config::ConfigError;
use rust_decimal::Decimal;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Flat shipping rate charged below the free-shipping threshold.
pub const SHIPPING_COST: Decimal = Decimal::from_parts(15, 0, 0, false, 0);

/// Subtotal from which shipping is free.
pub const FREE_SHIPPING_OVER: Decimal = Decimal::from_parts(500, 0, 0, false, 0);

// =============================================================================
// Backend state
// =============================================================================

#[derive(Default)]
struct Backend {
    products: Vec<Product>,
    deleted: HashSet<ProductId>,
    users: Vec<(User, String)>,
    tokens: HashMap<String, UserId>,
    orders: Vec<(UserId, Value)>,
    subscribers: HashSet<String>,
    requests: Vec<String>,
    validation_down: bool,
    order_refusal: Option<String>,
    next_id: u32,
}

impl Backend {
    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}{}", self.next_id)
    }

    fn live_product(&self, id: &ProductId) -> Option<&Product> {
        if self.deleted.contains(id) {
            return None;
        }
        self.products
            .iter()
            .find(|p| p.server_id() == Some(id))
    }

    fn bearer_user(&self, headers: &HeaderMap) -> Option<User> {
        let token = headers
            .get(header::AUTHORIZATION)?
            .to_str()
            .ok()?
            .strip_prefix("Bearer ")?;
        let user_id = self.tokens.get(token)?;
        self.users
            .iter()
            .find(|(user, _)| &user.id == user_id)
            .map(|(user, _)| user.clone())
    }
}

type Shared = Arc<Mutex<Backend>>;

fn lock(state: &Shared) -> MutexGuard<'_, Backend> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

// =============================================================================
// MockApi
// =============================================================================

/// In-process storefront API.
pub struct MockApi {
    addr: SocketAddr,
    state: Shared,
    server: JoinHandle<()>,
}

impl MockApi {
    /// Bind to an ephemeral port and start serving.
    ///
    /// # Errors
    ///
    /// Returns an error if the listener cannot be bound.
    pub async fn start() -> std::io::Result<Self> {
        let state = Shared::default();
        let app = router(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let server = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Ok(Self { addr, state, server })
    }

    /// Base URL of the API, including the `/api` prefix.
    #[must_use]
    pub fn api_url(&self) -> String {
        format!("http://{}/api", self.addr)
    }

    /// Client configuration pointing at this server.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is rejected.
    pub fn config(&self, data_dir: &FsPath) -> Result<StorefrontConfig, ConfigError> {
        StorefrontConfig::for_api(&self.api_url(), data_dir)
    }

    /// Add a catalog product and return its id.
    #[must_use]
    pub fn add_product(&self, name: &str, price: Decimal, stock: u32) -> ProductId {
        let mut backend = lock(&self.state);
        let id = ProductId::new(backend.next_id("p"));
        let mut product = Product::sample(name, "Paper", price);
        product.key = ItemKey::server(id.clone());
        product.stock = stock;
        backend.products.push(product);
        id
    }

    /// Delete a product from the catalog.
    pub fn remove_product(&self, id: &ProductId) {
        lock(&self.state).deleted.insert(id.clone());
    }

    /// Register an account that can sign in with `password`.
    #[must_use]
    pub fn add_user(&self, name: &str, email: &str, password: &str, is_admin: bool) -> User {
        let mut backend = lock(&self.state);
        let user = User {
            id: UserId::new(backend.next_id("u")),
            email: email.to_string(),
            name: name.to_string(),
            is_admin,
            phone: None,
            avatar: None,
        };
        backend.users.push((user.clone(), password.to_string()));
        user
    }

    /// Forget every issued token, as if all sessions expired.
    pub fn expire_sessions(&self) {
        lock(&self.state).tokens.clear();
    }

    /// Make `POST /products/validate` answer 500.
    pub fn break_validation(&self) {
        lock(&self.state).validation_down = true;
    }

    /// Refuse every new order with `message`.
    pub fn refuse_orders(&self, message: &str) {
        lock(&self.state).order_refusal = Some(message.to_string());
    }

    /// Number of requests received matching `"<METHOD> <path>"`.
    #[must_use]
    pub fn hits(&self, route: &str) -> usize {
        lock(&self.state)
            .requests
            .iter()
            .filter(|r| r.as_str() == route)
            .count()
    }

    /// Total number of requests received.
    #[must_use]
    pub fn total_hits(&self) -> usize {
        lock(&self.state).requests.len()
    }
}

impl Drop for MockApi {
    fn drop(&mut self) {
        self.server.abort();
    }
}

// =============================================================================
// Routes
// =============================================================================

fn router(state: Shared) -> Router {
    Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/auth/me", get(me))
        .route("/api/products", get(list_products))
        .route("/api/products/validate", post(validate_products))
        .route("/api/products/{id}", get(get_product).put(update_product))
        .route("/api/orders", post(place_order))
        .route("/api/orders/my", get(my_orders))
        .route("/api/shipping/calculate", post(calculate_shipping))
        .route("/api/dashboard/stats", get(dashboard_stats))
        .route("/api/newsletter/subscribe", post(subscribe))
        .layer(middleware::from_fn_with_state(state.clone(), record))
        .with_state(state)
}

async fn record(State(state): State<Shared>, request: Request, next: Next) -> Response {
    {
        let line = format!("{} {}", request.method(), request.uri().path());
        lock(&state).requests.push(line);
    }
    next.run(request).await
}

fn ok(data: Value) -> Response {
    Json(json!({ "success": true, "data": data })).into_response()
}

fn fail(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "success": false, "message": message }))).into_response()
}

fn to_value<T: serde::Serialize>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or(Value::Null)
}

async fn login(State(state): State<Shared>, Json(body): Json<Value>) -> Response {
    let email = body["email"].as_str().unwrap_or_default();
    let password = body["password"].as_str().unwrap_or_default();

    let mut backend = lock(&state);
    let Some(user) = backend
        .users
        .iter()
        .find(|(u, p)| u.email == email && p == password)
        .map(|(u, _)| u.clone())
    else {
        return fail(StatusCode::UNAUTHORIZED, "Invalid email or password");
    };
    let token = backend.next_id("token-");
    backend.tokens.insert(token.clone(), user.id.clone());
    ok(json!({ "token": token, "user": to_value(&user) }))
}

async fn me(State(state): State<Shared>, headers: HeaderMap) -> Response {
    match lock(&state).bearer_user(&headers) {
        Some(user) => ok(to_value(&user)),
        None => fail(StatusCode::UNAUTHORIZED, "Not authorized"),
    }
}

async fn list_products(State(state): State<Shared>, Query(params): Query<HashMap<String, String>>) -> Response {
    let backend = lock(&state);
    let products: Vec<&Product> = backend
        .products
        .iter()
        .filter(|p| p.server_id().is_some_and(|id| !backend.deleted.contains(id)))
        .filter(|p| params.get("category").is_none_or(|c| &p.category == c))
        .collect();
    ok(json!({
        "products": to_value(&products),
        "total": products.len(),
        "page": 1,
        "pages": 1,
    }))
}

async fn get_product(State(state): State<Shared>, Path(id): Path<String>) -> Response {
    match lock(&state).live_product(&ProductId::new(id)) {
        Some(product) => ok(to_value(product)),
        None => fail(StatusCode::NOT_FOUND, "Product not found"),
    }
}

async fn update_product(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    let mut backend = lock(&state);
    if !backend.bearer_user(&headers).is_some_and(|u| u.is_admin) {
        return fail(StatusCode::FORBIDDEN, "Admin access required");
    }
    let id = ProductId::new(id);
    let Some(product) = backend
        .products
        .iter_mut()
        .find(|p| p.server_id() == Some(&id))
    else {
        return fail(StatusCode::NOT_FOUND, "Product not found");
    };
    if let Some(name) = body["name"].as_str() {
        product.name = name.to_string();
    }
    if let Ok(price) = serde_json::from_value::<Decimal>(body["price"].clone()) {
        product.price = price;
    }
    ok(to_value(product))
}

async fn validate_products(State(state): State<Shared>, Json(body): Json<Value>) -> Response {
    let backend = lock(&state);
    if backend.validation_down {
        return fail(StatusCode::INTERNAL_SERVER_ERROR, "Validation unavailable");
    }
    let ids: Vec<ProductId> = serde_json::from_value(body["productIds"].clone()).unwrap_or_default();
    let (valid, deleted): (Vec<ProductId>, Vec<ProductId>) =
        ids.into_iter().partition(|id| backend.live_product(id).is_some());
    ok(json!({ "validIds": to_value(&valid), "deletedIds": to_value(&deleted) }))
}

async fn place_order(State(state): State<Shared>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    let mut backend = lock(&state);
    let Some(user) = backend.bearer_user(&headers) else {
        return fail(StatusCode::UNAUTHORIZED, "Not authorized");
    };
    if let Some(message) = backend.order_refusal.clone() {
        return fail(StatusCode::CONFLICT, &message);
    }

    let mut lines = Vec::new();
    let mut subtotal = Decimal::ZERO;
    for item in body["items"].as_array().into_iter().flatten() {
        let id = ProductId::new(item["productId"].as_str().unwrap_or_default());
        let quantity = item["quantity"].as_u64().unwrap_or_default();
        let Some(product) = backend.live_product(&id) else {
            return fail(StatusCode::BAD_REQUEST, "A product in your cart is no longer available");
        };
        subtotal += product.price * Decimal::from(quantity);
        lines.push(json!({
            "productId": id.as_str(),
            "name": product.name,
            "price": to_value(&product.price),
            "quantity": quantity,
        }));
    }

    let shipping = if subtotal >= FREE_SHIPPING_OVER {
        Decimal::ZERO
    } else {
        SHIPPING_COST
    };
    let id = backend.next_id("o");
    let order = json!({
        "id": id,
        "orderNumber": format!("PC-{id}"),
        "userId": user.id.as_str(),
        "status": "pending",
        "items": lines,
        "subtotal": to_value(&subtotal),
        "shippingCost": to_value(&shipping),
        "total": to_value(&(subtotal + shipping)),
        "shipping": body["shipping"].clone(),
        "paymentMethod": body["paymentMethod"].clone(),
        "createdAt": "2026-03-02T10:15:00Z",
    });
    backend.orders.push((user.id, order.clone()));
    (StatusCode::CREATED, Json(json!({ "success": true, "data": order }))).into_response()
}

async fn my_orders(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let backend = lock(&state);
    let Some(user) = backend.bearer_user(&headers) else {
        return fail(StatusCode::UNAUTHORIZED, "Not authorized");
    };
    let orders: Vec<&Value> = backend
        .orders
        .iter()
        .filter(|(owner, _)| owner == &user.id)
        .map(|(_, order)| order)
        .collect();
    ok(json!(orders))
}

async fn calculate_shipping(Json(body): Json<Value>) -> Response {
    let subtotal = serde_json::from_value::<Decimal>(body["subtotal"].clone()).unwrap_or_default();
    if body["city"].as_str() == Some("Atlantis") {
        return fail(StatusCode::NOT_FOUND, "We do not deliver to Atlantis yet");
    }
    ok(json!({
        "zoneName": "Metro",
        "cost": to_value(&SHIPPING_COST),
        "freeShipping": subtotal >= FREE_SHIPPING_OVER,
        "freeShippingThreshold": to_value(&FREE_SHIPPING_OVER),
        "estimatedDays": "1-2",
    }))
}

async fn dashboard_stats(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let backend = lock(&state);
    match backend.bearer_user(&headers) {
        None => fail(StatusCode::UNAUTHORIZED, "Not authorized"),
        Some(user) if !user.is_admin => fail(StatusCode::FORBIDDEN, "Admin access required"),
        Some(_) => ok(json!({
            "totalRevenue": "0",
            "totalOrders": backend.orders.len(),
            "totalProducts": backend.products.len(),
            "totalUsers": backend.users.len(),
        })),
    }
}

async fn subscribe(State(state): State<Shared>, Json(body): Json<Value>) -> Response {
    let email = body["email"].as_str().unwrap_or_default().to_string();
    if lock(&state).subscribers.insert(email) {
        ok(Value::Null)
    } else {
        Json(json!({ "success": false, "message": "This email is already subscribed" })).into_response()
    }
}

//! `Shop`: the API client and application state behind one handle.
//!
//! Every remote call made through `Shop` passes through [`Shop::settle`],
//! which tears the session down when the server reports it expired.
//! Methods take `&mut self`, so a second action cannot start while one is
//! in flight.

mod account;
mod admin;

use std::sync::Arc;

use paperclip_core::account::User;
use paperclip_core::order::{Order, ShippingDetails};
use paperclip_core::{PaymentMethod, Product, ProductId, ProductPage, ProductQuery};
use tracing::{info, instrument, warn};

use crate::api::ApiClient;
use crate::checkout::{self, CheckoutSummary};
use crate::config::StorefrontConfig;
use crate::error::{AppError, Result, clear_sentry_user};
use crate::persist::Persistence;
use crate::reconcile::{self, ListKind, RemovalNotice};
use crate::session::{Bootstrap, SessionState};
use crate::state::ShopState;
use crate::storage::{FileStorage, Storage};

/// Storefront client: remote calls plus local state.
#[derive(Debug)]
pub struct Shop {
    client: ApiClient,
    state: ShopState,
}

impl Shop {
    /// Open the shop with file storage under the configured data directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the data directory or HTTP client cannot be set up.
    pub fn open(config: &StorefrontConfig) -> Result<Self> {
        let storage = FileStorage::open(&config.data_dir)?;
        Self::with_storage(config, Arc::new(storage))
    }

    /// Open the shop over any storage backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn with_storage(config: &StorefrontConfig, storage: Arc<dyn Storage>) -> Result<Self> {
        let client = ApiClient::new(config)?;
        let state = ShopState::load(Persistence::new(storage));
        Ok(Self { client, state })
    }

    #[must_use]
    pub const fn client(&self) -> &ApiClient {
        &self.client
    }

    #[must_use]
    pub const fn state(&self) -> &ShopState {
        &self.state
    }

    /// Local cart and wishlist mutations.
    pub fn state_mut(&mut self) -> &mut ShopState {
        &mut self.state
    }

    #[must_use]
    pub const fn session(&self) -> &SessionState {
        self.state.session()
    }

    // =========================================================================
    // Session
    // =========================================================================

    /// First bootstrap step: adopt the cached user as `Tentative`.
    ///
    /// The cached token is attached straight away so calls made while
    /// confirmation is pending are authenticated.
    pub fn restore_session(&mut self) -> Bootstrap {
        let bootstrap = Bootstrap::restore(self.state.persistence());
        if bootstrap.state().is_signed_in() {
            self.client.set_token(bootstrap.token().cloned());
        }
        self.state.set_session(bootstrap.state().clone());
        bootstrap
    }

    /// Second bootstrap step: confirm the cached token with the server.
    pub async fn confirm_session(&mut self, bootstrap: Bootstrap) -> &SessionState {
        let persistence = self.state.persistence().clone();
        let session = bootstrap.confirm(&self.client, &persistence).await;
        self.state.set_session(session);
        self.state.session()
    }

    /// Run both bootstrap steps.
    pub async fn bootstrap(&mut self) -> &SessionState {
        let bootstrap = self.restore_session();
        self.confirm_session(bootstrap).await
    }

    /// Clear the session after the server rejected the token.
    fn expire_session(&mut self) {
        warn!("Session expired, clearing stored credentials");
        self.client.set_token(None);
        self.state.sign_out();
        clear_sentry_user();
    }

    /// Map a call result, tearing the session down on expiry.
    fn settle<T, E>(&mut self, result: std::result::Result<T, E>) -> Result<T>
    where
        E: Into<AppError>,
    {
        match result.map_err(Into::<AppError>::into) {
            Err(AppError::SessionExpired) => {
                self.expire_session();
                Err(AppError::SessionExpired)
            }
            other => other,
        }
    }

    fn require_user(&self) -> Result<&User> {
        self.state.session().user().ok_or(AppError::NotSignedIn)
    }

    fn require_admin(&self) -> Result<()> {
        self.require_user()?;
        if self.state.session().is_admin() {
            Ok(())
        } else {
            Err(AppError::Forbidden)
        }
    }

    // =========================================================================
    // Catalog
    // =========================================================================

    /// # Errors
    ///
    /// Returns a validation error for an inconsistent query, or an error if
    /// the API request fails.
    pub async fn products(&mut self, query: &ProductQuery) -> Result<ProductPage> {
        let result = self.client.list_products(query).await;
        self.settle(result)
    }

    /// # Errors
    ///
    /// Returns an error if the product is not found or the request fails.
    pub async fn product(&mut self, id: &ProductId) -> Result<Product> {
        let result = self.client.get_product(id).await;
        self.settle(result)
    }

    /// # Errors
    ///
    /// Returns an error if the API request fails.
    pub async fn categories(&mut self) -> Result<Vec<String>> {
        let result = self.client.categories().await;
        self.settle(result)
    }

    // =========================================================================
    // Cart & wishlist visits
    // =========================================================================

    /// Reconcile the cart with the catalog and take any removal notice.
    ///
    /// # Errors
    ///
    /// Returns `SessionExpired` if the server rejected the session. Other
    /// failures leave the cart unchanged and return `Ok(None)`.
    #[instrument(skip(self))]
    pub async fn visit_cart(&mut self) -> Result<Option<RemovalNotice>> {
        let result = reconcile::reconcile_cart(&self.client, &mut self.state).await;
        self.settle(result)?;
        Ok(self.state.take_notice(ListKind::Cart))
    }

    /// Reconcile the wishlist with the catalog and take any removal notice.
    ///
    /// # Errors
    ///
    /// Returns `SessionExpired` if the server rejected the session. Other
    /// failures leave the wishlist unchanged and return `Ok(None)`.
    #[instrument(skip(self))]
    pub async fn visit_wishlist(&mut self) -> Result<Option<RemovalNotice>> {
        let result = reconcile::reconcile_wishlist(&self.client, &mut self.state).await;
        self.settle(result)?;
        Ok(self.state.take_notice(ListKind::Wishlist))
    }

    // =========================================================================
    // Checkout
    // =========================================================================

    /// # Errors
    ///
    /// Returns an error for an empty cart or blank city, or if the city is
    /// not served.
    pub async fn checkout_quote(&mut self, city: &str) -> Result<CheckoutSummary> {
        let result = checkout::quote(&self.client, self.state.cart(), city).await;
        self.settle(result)
    }

    /// Place an order for the whole cart. The cart is cleared on success.
    ///
    /// # Errors
    ///
    /// Returns an error if validation fails or the order is refused; the
    /// cart is kept in both cases.
    pub async fn place_order(&mut self, shipping: &ShippingDetails, payment_method: PaymentMethod) -> Result<Order> {
        let result = checkout::place_order(&self.client, &mut self.state, shipping, payment_method).await;
        let order = self.settle(result)?;
        info!(order = %order.reference(), "Checkout complete");
        Ok(order)
    }
}

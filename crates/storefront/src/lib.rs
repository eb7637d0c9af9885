//! Paperclip Storefront client library.
//!
//! Everything the storefront does on the client side: talking to the REST
//! API, persisting the cart, wishlist and session locally, and keeping them
//! consistent with the server.
//!
//! # Modules
//!
//! - [`api`] - REST client (envelope decoding, bearer token, 401 handling)
//! - [`storage`] / [`persist`] - Key/value storage and the typed boundary over it
//! - [`state`] - Application state with named mutations
//! - [`session`] - Two-step session bootstrap
//! - [`reconcile`] - Dropping deleted products from local lists
//! - [`checkout`] - Shipping quote and order placement
//! - [`shop`] - The handle tying all of the above together

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod checkout;
pub mod config;
pub mod error;
pub mod persist;
pub mod reconcile;
pub mod session;
pub mod shop;
pub mod state;
pub mod storage;

pub use api::{ApiClient, ApiError};
pub use config::StorefrontConfig;
pub use error::{AppError, Result};
pub use session::SessionState;
pub use shop::Shop;

//! Paperclip Core - Shared domain types for the office-supply storefront.
//!
//! This crate provides the types and pure logic used by every Paperclip
//! component:
//! - `storefront` - Remote API client, persistence, application state
//! - `cli` - Command-line view layer
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients, no storage. Cart and wishlist rules live here so they can be
//! tested without a backend.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, money, emails, statuses
//! - [`catalog`] - Products and the catalog query
//! - [`cart`] / [`wishlist`] - Keyed collections with their invariants
//! - [`account`], [`order`], [`shipping`], [`content`], [`admin`] - API payloads and forms
//! - [`validation`] - Client-side validation errors and helpers

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod account;
pub mod admin;
pub mod cart;
pub mod catalog;
pub mod content;
pub mod order;
pub mod shipping;
pub mod types;
pub mod validation;
pub mod wishlist;

pub use cart::{AddOutcome, Cart, CartItem, QuantityChange};
pub use catalog::{Keyed, Product, ProductPage, ProductQuery, SortOrder};
pub use types::*;
pub use validation::ValidationError;
pub use wishlist::Wishlist;

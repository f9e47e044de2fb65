//! The Wind Core - Shared data model.
//!
//! This crate provides the records exchanged with the storefront backend and
//! used across all The Wind components:
//! - `storefront` - Shopper-facing client library (cart, checkout, catalog)
//! - `admin` - Admin console containers (users, products, orders)
//! - `cli` - The `wind` terminal front end
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients, no persistence. Every backend payload is decoded into these
//! types at the HTTP boundary and nothing untyped travels past it.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for ids, prices, emails, and statuses
//! - [`cart`] - Cart, line items and cart ownership
//! - [`catalog`] - Products and product edits
//! - [`account`] - Users and authentication payloads
//! - [`order`] - Checkout snapshots and orders
//! - [`filters`] - Catalog filter record and its URL query encoding

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod account;
pub mod cart;
pub mod catalog;
pub mod filters;
pub mod order;
pub mod types;

pub use account::{AuthResponse, NewUser, User, UserUpdate};
pub use cart::{Cart, CartIdentity, CartItem, LineKey};
pub use catalog::{NewProduct, Product, ProductImage, ProductUpdate};
pub use filters::{FilterField, Filters, SortKey};
pub use order::{AdminOrder, Checkout, CheckoutItem, NewCheckout, Order, ShippingAddress};
pub use types::*;

//! The Wind admin console library.
//!
//! User, product and order management for admin accounts, layered on the
//! storefront client: same backend, same token store, same
//! loading/error cycle.
//!
//! # Security
//!
//! Admin endpoints are authorized by the backend. [`AdminConsole::open`]
//! only keeps non-admin sessions from reaching the console.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod console;
pub mod containers;
pub mod error;

pub use api::AdminApi;
pub use console::AdminConsole;
pub use containers::{AdminOrdersState, ListState, OrdersAdmin, ProductsAdmin, UsersAdmin};
pub use error::AdminError;

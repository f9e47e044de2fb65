//! The Wind storefront client library.
//!
//! Shopper-facing state for the storefront: cart, session, catalog,
//! checkout and order history, all backed by the storefront HTTP backend.
//!
//! # Architecture
//!
//! - [`api`] - typed HTTP client; decodes every payload into `the_wind_core`
//! - [`storage`] - persisted key/value records (cart, token, user, guest id)
//! - [`containers`] - state containers with observable loading/error flags
//! - [`payment`] - payment button settings and the provider seam
//! - [`state`] - [`Storefront`], which builds every container and runs the
//!   flows that span more than one

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod config;
pub mod containers;
pub mod error;
pub mod payment;
pub mod state;
pub mod storage;

pub use api::{ApiClient, ApiError};
pub use config::{ConfigError, PaymentConfig, StorefrontConfig};
pub use error::{CheckoutError, CheckoutStage, Operation, OperationError};
pub use state::{Confirmation, SignIn, Storefront};

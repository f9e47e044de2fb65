//! Subcommand implementations.
//!
//! Commands print their results to stdout as pretty JSON; logs go to
//! stderr.

pub mod account;
pub mod admin;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod orders;

use std::fmt::Display;

use serde::Serialize;
use the_wind_admin::AdminError;
use the_wind_storefront::{ApiError, CheckoutError, ConfigError, OperationError};
use thiserror::Error;

/// Errors surfaced by a command.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Operation(#[from] OperationError),

    #[error(transparent)]
    Checkout(#[from] CheckoutError),

    #[error(transparent)]
    Admin(#[from] AdminError),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Output error: {0}")]
    Output(#[from] serde_json::Error),
}

impl CliError {
    /// Log the underlying cause; operation failures go through their own
    /// reporting so client-side faults reach Sentry.
    pub fn report(&self) {
        match self {
            Self::Operation(e)
            | Self::Checkout(
                CheckoutError::Create(e) | CheckoutError::Pay(e) | CheckoutError::Finalize(e),
            ) => e.report(),
            Self::Admin(e) => e.report(),
            _ => {}
        }
    }
}

/// Print `value` as pretty JSON.
#[allow(clippy::print_stdout)]
pub fn emit<T: Serialize + ?Sized>(value: &T) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print one line of text.
#[allow(clippy::print_stdout)]
pub fn say(message: impl Display) {
    println!("{message}");
}

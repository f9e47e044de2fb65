//! Payment button seam.
//!
//! The payment provider runs its own approval flow; all this crate needs
//! from it is the capture payload, which is passed to the backend
//! verbatim. [`PaymentProvider`] is that seam.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use the_wind_core::Price;
use tracing::debug;

use crate::config::PaymentConfig;
use crate::error::CheckoutError;

/// What the provider should do once the buyer approves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentIntent {
    Capture,
}

/// Everything needed to render the payment button.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentButtonConfig {
    pub client_id: String,
    pub currency: String,
    pub intent: PaymentIntent,
    /// Amount with exactly two decimals, as the provider expects
    pub amount: String,
}

impl PaymentButtonConfig {
    /// Configure a capture button for `amount`.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::PaymentNotConfigured` when no client id is
    /// set.
    pub fn configure(config: &PaymentConfig, amount: Price) -> Result<Self, CheckoutError> {
        Ok(Self {
            client_id: config.require_client_id()?.to_string(),
            currency: config.currency.clone(),
            intent: PaymentIntent::Capture,
            amount: amount.to_fixed(),
        })
    }
}

/// The provider refused or the buyer backed out.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct PaymentDeclined(pub String);

/// External payment provider.
#[async_trait]
pub trait PaymentProvider: Send + Sync {
    /// Run the provider's approval for `button` and return its capture
    /// payload.
    ///
    /// # Errors
    ///
    /// Returns `PaymentDeclined` when the payment is not approved.
    async fn approve(&self, button: &PaymentButtonConfig) -> Result<Value, PaymentDeclined>;
}

/// Provider whose capture already happened elsewhere; hands back the
/// payload it was given.
#[derive(Debug, Clone)]
pub struct PresetApproval {
    payload: Value,
}

impl PresetApproval {
    #[must_use]
    pub const fn new(payload: Value) -> Self {
        Self { payload }
    }
}

#[async_trait]
impl PaymentProvider for PresetApproval {
    async fn approve(&self, button: &PaymentButtonConfig) -> Result<Value, PaymentDeclined> {
        debug!(amount = %button.amount, currency = %button.currency, "Using preset payment approval");
        Ok(self.payload.clone())
    }
}

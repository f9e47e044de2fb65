//! Checkout endpoints.

use reqwest::Method;
use serde::Serialize;
use serde_json::json;
use the_wind_core::order::PaymentConfirmation;
use the_wind_core::{Checkout, CheckoutId, NewCheckout, Order};
use tracing::instrument;

use super::{ApiClient, ApiError};

impl ApiClient {
    /// `POST /api/checkout`: snapshot the cart server-side.
    ///
    /// # Errors
    ///
    /// Returns an error if no token is stored, the request fails, or the
    /// body is not a checkout.
    #[instrument(skip(self, checkout), fields(items = checkout.checkout_items.len(), total = %checkout.total_price))]
    pub async fn create_checkout(&self, checkout: &NewCheckout) -> Result<Checkout, ApiError> {
        let url = self.endpoint(&["api", "checkout"])?;
        self.send(self.authorized(Method::POST, url)?.json(checkout)).await
    }

    /// `PUT /api/checkout/:id/pay` with the provider payload passed through
    /// verbatim.
    ///
    /// # Errors
    ///
    /// Returns an error if no token is stored or the request fails.
    #[instrument(skip(self, payment_details), fields(checkout_id = %id))]
    pub async fn pay_checkout<T: Serialize + Sync>(
        &self,
        id: &CheckoutId,
        payment_details: &T,
    ) -> Result<(), ApiError> {
        let url = self.endpoint(&["api", "checkout", id.as_str(), "pay"])?;
        let body = PaymentConfirmation::paid(payment_details);
        self.send_discarding(self.authorized(Method::PUT, url)?.json(&body))
            .await
    }

    /// `POST /api/checkout/:id/finalize`: turn a paid checkout into an order.
    ///
    /// # Errors
    ///
    /// Returns an error if no token is stored, the request fails, or the
    /// body is not an order.
    #[instrument(skip(self), fields(checkout_id = %id))]
    pub async fn finalize_checkout(&self, id: &CheckoutId) -> Result<Order, ApiError> {
        let url = self.endpoint(&["api", "checkout", id.as_str(), "finalize"])?;
        self.send(self.authorized(Method::POST, url)?.json(&json!({})))
            .await
    }
}

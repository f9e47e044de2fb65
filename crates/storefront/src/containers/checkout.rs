//! Checkout flow.
//!
//! A linear state machine: no-checkout → created → paid → finalized. Each
//! step is one backend call with no retry. A failed payment or
//! finalization halts the flow where it stands; nothing is undone.

use std::sync::Arc;

use serde::Serialize;
use the_wind_core::{Cart, Checkout, CheckoutId, NewCheckout, Order, ShippingAddress};
use tracing::{info, instrument};

use super::{RequestStatus, StateCell, Tracked};
use crate::api::ApiClient;
use crate::config::PaymentConfig;
use crate::error::{CheckoutError, CheckoutStage, Operation};
use crate::payment::{PaymentButtonConfig, PaymentProvider};

/// Snapshot of the checkout flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutState {
    pub stage: CheckoutStage,
    /// Checkout created by the backend; its id drives the later steps
    pub checkout: Option<Checkout>,
    /// Order produced by finalization
    pub order: Option<Order>,
    pub status: RequestStatus,
}

impl Default for CheckoutState {
    fn default() -> Self {
        Self {
            stage: CheckoutStage::NoCheckout,
            checkout: None,
            order: None,
            status: RequestStatus::default(),
        }
    }
}

impl Tracked for CheckoutState {
    fn status_mut(&mut self) -> &mut RequestStatus {
        &mut self.status
    }
}

/// Drives one checkout from cart snapshot to order.
#[derive(Clone)]
pub struct CheckoutFlow {
    inner: Arc<CheckoutInner>,
}

struct CheckoutInner {
    api: ApiClient,
    payment: PaymentConfig,
    state: StateCell<CheckoutState>,
}

impl CheckoutFlow {
    #[must_use]
    pub fn new(api: ApiClient, payment: PaymentConfig) -> Self {
        Self {
            inner: Arc::new(CheckoutInner {
                api,
                payment,
                state: StateCell::new(CheckoutState::default()),
            }),
        }
    }

    #[must_use]
    pub fn snapshot(&self) -> CheckoutState {
        self.inner.state.snapshot()
    }

    #[must_use]
    pub fn stage(&self) -> CheckoutStage {
        self.inner.state.read(|state| state.stage)
    }

    /// Snapshot `cart` and create the checkout server-side.
    ///
    /// An unpaid or finalized checkout is replaced by the new one.
    ///
    /// # Errors
    ///
    /// Returns `EmptyCart` without a call for an empty cart,
    /// `InvalidTransition` while a paid checkout awaits finalization, and
    /// `Create` (`Checkout failed`) when the backend call fails.
    #[instrument(skip(self, cart, shipping_address), fields(items = cart.items.len()))]
    pub async fn create(
        &self,
        cart: &Cart,
        shipping_address: ShippingAddress,
    ) -> Result<Checkout, CheckoutError> {
        let from = self.stage();
        if from == CheckoutStage::Paid {
            return Err(CheckoutError::InvalidTransition {
                from,
                action: "create",
            });
        }
        let request =
            NewCheckout::from_cart(cart, shipping_address).ok_or(CheckoutError::EmptyCart)?;

        let checkout = self
            .inner
            .state
            .track(
                Operation::CreateCheckout,
                self.inner.api.create_checkout(&request),
                |state, checkout| {
                    state.stage = CheckoutStage::Created;
                    state.checkout = Some(checkout.clone());
                    state.order = None;
                    checkout
                },
            )
            .await
            .map_err(CheckoutError::Create)?;

        info!(checkout_id = %checkout.id, total = %checkout.total_price, "Checkout created");
        Ok(checkout)
    }

    /// Button settings for the created checkout's total.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` before a checkout exists and
    /// `PaymentNotConfigured` without a client id.
    pub fn payment_button(&self) -> Result<PaymentButtonConfig, CheckoutError> {
        let total = self.inner.state.read(|state| match (&state.stage, &state.checkout) {
            (CheckoutStage::Created, Some(checkout)) => Ok(checkout.total_price),
            (stage, _) => Err(CheckoutError::InvalidTransition {
                from: *stage,
                action: "render payment for",
            }),
        })?;
        PaymentButtonConfig::configure(&self.inner.payment, total)
    }

    /// Mark the checkout paid with the provider's capture payload.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` unless the checkout is created, and
    /// `Pay` (`Payment processing failed. Please try again.`) when the
    /// backend call fails; the checkout stays created.
    #[instrument(skip(self, payment_details))]
    pub async fn pay<T: Serialize + Sync>(&self, payment_details: &T) -> Result<(), CheckoutError> {
        let checkout_id = self.checkout_id(CheckoutStage::Created, "pay")?;

        self.inner
            .state
            .track(
                Operation::PayCheckout,
                self.inner.api.pay_checkout(&checkout_id, payment_details),
                |state, ()| state.stage = CheckoutStage::Paid,
            )
            .await
            .map_err(CheckoutError::Pay)?;

        info!(checkout_id = %checkout_id, "Checkout paid");
        Ok(())
    }

    /// Turn the paid checkout into an order.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` unless the checkout is paid, and
    /// `Finalize` (`Order finalization failed.`) when the backend call
    /// fails; the checkout stays paid.
    #[instrument(skip(self))]
    pub async fn finalize(&self) -> Result<Order, CheckoutError> {
        let checkout_id = self.checkout_id(CheckoutStage::Paid, "finalize")?;

        let order = self
            .inner
            .state
            .track(
                Operation::FinalizeCheckout,
                self.inner.api.finalize_checkout(&checkout_id),
                |state, order| {
                    state.stage = CheckoutStage::Finalized;
                    state.order = Some(order.clone());
                    order
                },
            )
            .await
            .map_err(CheckoutError::Finalize)?;

        info!(checkout_id = %checkout_id, order_id = %order.id, "Checkout finalized");
        Ok(order)
    }

    /// Payment success callback: pay, then finalize straight away.
    ///
    /// # Errors
    ///
    /// Returns the first failing step's error; later steps are not run.
    pub async fn complete_payment<T: Serialize + Sync>(
        &self,
        payment_details: &T,
    ) -> Result<Order, CheckoutError> {
        self.pay(payment_details).await?;
        self.finalize().await
    }

    /// Run the provider's approval for the created checkout, then pay and
    /// finalize.
    ///
    /// # Errors
    ///
    /// Returns `PaymentDeclined` when the provider refuses, otherwise as
    /// [`Self::complete_payment`].
    pub async fn approve_with(
        &self,
        provider: &dyn PaymentProvider,
    ) -> Result<Order, CheckoutError> {
        let button = self.payment_button()?;
        let details = provider
            .approve(&button)
            .await
            .map_err(|e| CheckoutError::PaymentDeclined(e.0))?;
        self.complete_payment(&details).await
    }

    /// Start over with no checkout.
    pub fn reset(&self) {
        self.inner
            .state
            .update(|state| *state = CheckoutState::default());
    }

    fn checkout_id(
        &self,
        expected: CheckoutStage,
        action: &'static str,
    ) -> Result<CheckoutId, CheckoutError> {
        self.inner.state.read(|state| match &state.checkout {
            Some(checkout) if state.stage == expected => Ok(checkout.id.clone()),
            _ => Err(CheckoutError::InvalidTransition {
                from: state.stage,
                action,
            }),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::config::StorefrontConfig;
    use crate::storage::MemoryStore;

    fn flow() -> CheckoutFlow {
        let config = StorefrontConfig::for_backend("http://127.0.0.1:9", ".wind-test").unwrap();
        CheckoutFlow::new(
            ApiClient::new(&config, MemoryStore::shared()).unwrap(),
            PaymentConfig::default(),
        )
    }

    fn address() -> ShippingAddress {
        ShippingAddress {
            address: "1 Main St".to_string(),
            city: "Springfield".to_string(),
            postal_code: "12345".to_string(),
            country: "US".to_string(),
        }
    }

    #[tokio::test]
    async fn test_empty_cart_is_rejected_without_call() {
        let flow = flow();
        let err = flow.create(&Cart::empty(), address()).await.unwrap_err();
        assert!(matches!(err, CheckoutError::EmptyCart));
        assert_eq!(flow.stage(), CheckoutStage::NoCheckout);
        assert!(flow.snapshot().status.error.is_none());
    }

    #[tokio::test]
    async fn test_steps_out_of_order() {
        let flow = flow();
        assert!(matches!(
            flow.pay(&json!({})).await,
            Err(CheckoutError::InvalidTransition {
                from: CheckoutStage::NoCheckout,
                action: "pay"
            })
        ));
        assert!(matches!(
            flow.finalize().await,
            Err(CheckoutError::InvalidTransition {
                from: CheckoutStage::NoCheckout,
                ..
            })
        ));
        assert!(matches!(
            flow.payment_button(),
            Err(CheckoutError::InvalidTransition { .. })
        ));
    }
}

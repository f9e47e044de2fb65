//! Order history container.

use std::sync::Arc;

use the_wind_core::{Order, OrderId};
use tracing::instrument;

use super::{RequestStatus, StateCell, Tracked};
use crate::api::ApiClient;
use crate::error::{Operation, OperationError};

/// Snapshot of the signed-in user's orders.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrdersState {
    pub orders: Vec<Order>,
    pub total_orders: usize,
    pub order_details: Option<Order>,
    pub status: RequestStatus,
}

impl Tracked for OrdersState {
    fn status_mut(&mut self) -> &mut RequestStatus {
        &mut self.status
    }
}

#[derive(Clone)]
pub struct OrdersContainer {
    inner: Arc<OrdersInner>,
}

struct OrdersInner {
    api: ApiClient,
    state: StateCell<OrdersState>,
}

impl OrdersContainer {
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        Self {
            inner: Arc::new(OrdersInner {
                api,
                state: StateCell::new(OrdersState::default()),
            }),
        }
    }

    #[must_use]
    pub fn snapshot(&self) -> OrdersState {
        self.inner.state.snapshot()
    }

    /// Load the signed-in user's orders.
    ///
    /// # Errors
    ///
    /// Returns `Failed to fetch orders` and keeps the previous list.
    #[instrument(skip(self))]
    pub async fn fetch_my_orders(&self) -> Result<Vec<Order>, OperationError> {
        let call = self.inner.api.fetch_my_orders();
        self.inner
            .state
            .track(Operation::FetchMyOrders, call, |state, orders| {
                state.total_orders = orders.len();
                state.orders = orders.clone();
                orders
            })
            .await
    }

    /// Load one order.
    ///
    /// # Errors
    ///
    /// Returns `Failed to fetch order details` and keeps the previous
    /// details.
    #[instrument(skip(self), fields(order_id = %id))]
    pub async fn fetch_order_details(&self, id: &OrderId) -> Result<Order, OperationError> {
        let call = self.inner.api.fetch_order(id);
        self.inner
            .state
            .track(Operation::FetchOrderDetails, call, |state, order| {
                state.order_details = Some(order.clone());
                order
            })
            .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::api::ApiError;
    use crate::config::StorefrontConfig;
    use crate::storage::MemoryStore;

    #[tokio::test]
    async fn test_signed_out_fetch_is_rejected() {
        let config = StorefrontConfig::for_backend("http://127.0.0.1:9", ".wind-test").unwrap();
        let orders = OrdersContainer::new(ApiClient::new(&config, MemoryStore::shared()).unwrap());

        let err = orders.fetch_my_orders().await.unwrap_err();
        assert!(matches!(err.source, ApiError::MissingToken));
        assert_eq!(err.to_string(), "Failed to fetch orders");

        let state = orders.snapshot();
        assert!(state.orders.is_empty());
        assert_eq!(state.total_orders, 0);
        assert!(!state.status.loading);
    }
}

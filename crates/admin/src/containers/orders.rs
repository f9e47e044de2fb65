//! Order management.

use std::sync::Arc;

use the_wind_core::{AdminOrder, OrderId, OrderStatus, Price};
use the_wind_storefront::containers::{RequestStatus, StateCell, Tracked};
use the_wind_storefront::{Operation, OperationError};
use tracing::{info, instrument};

use super::{remove, splice};
use crate::api::AdminApi;

/// Snapshot of every order, with the dashboard totals.
///
/// The totals are computed when the list is fetched; later status
/// changes and deletions leave them as they were.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdminOrdersState {
    pub orders: Vec<AdminOrder>,
    pub total_orders: usize,
    pub total_sales: Price,
    pub status: RequestStatus,
}

impl Tracked for AdminOrdersState {
    fn status_mut(&mut self) -> &mut RequestStatus {
        &mut self.status
    }
}

#[derive(Clone)]
pub struct OrdersAdmin {
    inner: Arc<OrdersInner>,
}

struct OrdersInner {
    api: AdminApi,
    state: StateCell<AdminOrdersState>,
}

impl OrdersAdmin {
    #[must_use]
    pub fn new(api: AdminApi) -> Self {
        Self {
            inner: Arc::new(OrdersInner {
                api,
                state: StateCell::new(AdminOrdersState::default()),
            }),
        }
    }

    #[must_use]
    pub fn snapshot(&self) -> AdminOrdersState {
        self.inner.state.snapshot()
    }

    /// # Errors
    ///
    /// Returns `Failed to fetch orders` and keeps the previous list and
    /// totals.
    #[instrument(skip(self))]
    pub async fn fetch_all(&self) -> Result<Vec<AdminOrder>, OperationError> {
        let call = self.inner.api.fetch_orders();
        self.inner
            .state
            .track(Operation::FetchAllOrders, call, |state, orders| {
                state.total_orders = orders.len();
                state.total_sales = orders.iter().map(|order| order.total_price).sum();
                state.orders = orders.clone();
                orders
            })
            .await
    }

    /// # Errors
    ///
    /// Returns `Failed to update order`.
    #[instrument(skip(self), fields(order_id = %id, status = %status))]
    pub async fn update_status(
        &self,
        id: &OrderId,
        status: OrderStatus,
    ) -> Result<AdminOrder, OperationError> {
        let call = self.inner.api.update_order_status(id, status);
        let updated = self
            .inner
            .state
            .track(Operation::UpdateOrderStatus, call, |state, updated| {
                splice(&mut state.orders, updated.clone());
                updated
            })
            .await?;
        info!(order_id = %id, status = %updated.status, "Order status updated");
        Ok(updated)
    }

    /// # Errors
    ///
    /// Returns `Failed to delete order`; the order stays listed.
    #[instrument(skip(self), fields(order_id = %id))]
    pub async fn delete(&self, id: &OrderId) -> Result<(), OperationError> {
        let call = self.inner.api.delete_order(id);
        self.inner
            .state
            .track(Operation::DeleteOrder, call, |state, ()| {
                remove(&mut state.orders, id);
            })
            .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use the_wind_storefront::storage::MemoryStore;
    use the_wind_storefront::{ApiClient, StorefrontConfig};

    use super::*;

    #[tokio::test]
    async fn test_update_status_without_token() {
        let config = StorefrontConfig::for_backend("http://127.0.0.1:9", ".wind-test").unwrap();
        let orders = OrdersAdmin::new(AdminApi::new(
            ApiClient::new(&config, MemoryStore::shared()).unwrap(),
        ));

        let err = orders
            .update_status(&OrderId::from("o1"), OrderStatus::Shipped)
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Failed to update order");
        let state = orders.snapshot();
        assert_eq!(state.total_orders, 0);
        assert_eq!(state.total_sales, Price::ZERO);
    }
}

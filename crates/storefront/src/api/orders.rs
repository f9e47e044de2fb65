//! Order history endpoints.

use reqwest::Method;
use the_wind_core::{Order, OrderId};
use tracing::instrument;

use super::{ApiClient, ApiError};

impl ApiClient {
    /// `GET /api/orders/my-orders`.
    ///
    /// # Errors
    ///
    /// Returns an error if no token is stored, the request fails, or the
    /// body is not an order list.
    #[instrument(skip(self))]
    pub async fn fetch_my_orders(&self) -> Result<Vec<Order>, ApiError> {
        let url = self.endpoint(&["api", "orders", "my-orders"])?;
        self.send(self.authorized(Method::GET, url)?).await
    }

    /// `GET /api/orders/:id`.
    ///
    /// # Errors
    ///
    /// Returns an error if no token is stored, the request fails, or the
    /// body is not an order.
    #[instrument(skip(self), fields(order_id = %id))]
    pub async fn fetch_order(&self, id: &OrderId) -> Result<Order, ApiError> {
        let url = self.endpoint(&["api", "orders", id.as_str()])?;
        self.send(self.authorized(Method::GET, url)?).await
    }
}

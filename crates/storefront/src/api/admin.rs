//! Order management for staff.

use plateful_core::{OrderId, OrderStatus};
use reqwest::Method;
use tracing::{info, instrument};

use super::types::{Order, StatusUpdate};
use super::{ApiClient, ApiError};

impl ApiClient {
    /// Every order, optionally filtered by status.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails or the response is malformed.
    #[instrument(skip(self))]
    pub async fn list_all_orders(
        &self,
        status: Option<OrderStatus>,
    ) -> Result<Vec<Order>, ApiError> {
        let query: Vec<(&str, &str)> = status
            .map(|s| ("status", s.as_str()))
            .into_iter()
            .collect();
        let url = self.url(&["admin", "orders"], &query);
        self.send(self.request(Method::GET, url), "orders").await
    }

    /// Move an order to a new status.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] if the order does not exist, or another
    /// error if the backend refuses the change.
    #[instrument(skip(self), fields(order_id = %order_id, status = %status))]
    pub async fn update_order_status(
        &self,
        order_id: &OrderId,
        status: OrderStatus,
    ) -> Result<Order, ApiError> {
        let url = self.url(&["admin", "orders", order_id.as_str()], &[]);
        let order: Order = self
            .send(
                self.request(Method::PATCH, url).json(&StatusUpdate { status }),
                &format!("order {order_id}"),
            )
            .await?;
        info!("Order status updated");
        Ok(order)
    }
}

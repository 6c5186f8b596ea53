//! Order submission and history.

use async_trait::async_trait;
use plateful_core::{OrderId, UserId};
use reqwest::Method;
use tracing::{info, instrument};

use super::types::{Order, OrderRequest};
use super::{ApiClient, ApiError};
use crate::checkout::OrderSubmitter;

impl ApiClient {
    /// Submit an order.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the order or the request fails.
    #[instrument(skip(self, request), fields(user_id = %request.user_id, items = request.items.len()))]
    pub async fn submit_order(&self, request: &OrderRequest) -> Result<Order, ApiError> {
        let url = self.url(&["orders"], &[]);
        let order: Order = self
            .send(self.request(Method::POST, url).json(request), "orders")
            .await?;
        info!(order_id = %order.order_id, total = %order.total_amount, "Order placed");
        Ok(order)
    }

    /// Order history of one user, in the order the backend returns it.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails or the response is malformed.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn list_orders(&self, user_id: &UserId) -> Result<Vec<Order>, ApiError> {
        let url = self.url(&["orders"], &[("userId", user_id.as_str())]);
        self.send(self.request(Method::GET, url), "orders").await
    }

    /// Get one order.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] if the order does not exist, or another
    /// error if the request fails.
    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn get_order(&self, order_id: &OrderId) -> Result<Order, ApiError> {
        let url = self.url(&["orders", order_id.as_str()], &[]);
        self.send(
            self.request(Method::GET, url),
            &format!("order {order_id}"),
        )
        .await
    }
}

#[async_trait]
impl OrderSubmitter for ApiClient {
    async fn submit_order(&self, request: &OrderRequest) -> Result<Order, ApiError> {
        Self::submit_order(self, request).await
    }
}

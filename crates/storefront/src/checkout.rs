//! Turning the cart into an order.

use std::sync::Arc;

use async_trait::async_trait;
use plateful_core::UserId;
use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::api::ApiError;
use crate::api::types::{Order, OrderRequest};
use crate::cart::CartHandle;
use crate::error::add_breadcrumb;
use crate::notify::{Notification, NotificationKind, Notifier};

/// Somewhere orders can be sent.
#[async_trait]
pub trait OrderSubmitter: Send + Sync {
    /// Submit an order and return it as the backend recorded it.
    async fn submit_order(&self, request: &OrderRequest) -> Result<Order, ApiError>;
}

/// Errors from checkout.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Nothing to order.
    #[error("cart is empty")]
    EmptyCart,

    /// The backend did not accept the order.
    #[error("order submission failed: {0}")]
    Submit(#[from] ApiError),
}

impl CheckoutError {
    /// Whether this is an internal failure rather than a user mistake.
    #[must_use]
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Submit(_))
    }
}

/// The checkout flow for one cart.
#[derive(Clone)]
pub struct Checkout {
    cart: CartHandle,
    submitter: Arc<dyn OrderSubmitter>,
    notifier: Arc<dyn Notifier>,
}

impl Checkout {
    /// Create a checkout over `cart` that sends orders to `submitter`.
    #[must_use]
    pub fn new(
        cart: CartHandle,
        submitter: Arc<dyn OrderSubmitter>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            cart,
            submitter,
            notifier,
        }
    }

    /// Place an order for everything in the cart on behalf of `user_id`.
    ///
    /// On success the ordered quantities are taken out of the cart and the
    /// result is persisted; anything added while the order was in flight
    /// stays. On failure the cart is left as it was so the user can try
    /// again, and one error notification is emitted.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::EmptyCart`] if there is nothing to order, or
    /// [`CheckoutError::Submit`] if the backend rejects the order.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn submit(&self, user_id: &UserId) -> Result<Order, CheckoutError> {
        let lines = self.cart.lines();
        if lines.is_empty() {
            self.notifier.notify(Notification::new(
                NotificationKind::Error,
                "Your cart is empty",
            ));
            return Err(CheckoutError::EmptyCart);
        }

        let request = OrderRequest::from_lines(user_id.clone(), &lines);
        let item_count = request.items.len().to_string();
        add_breadcrumb(
            "checkout",
            "Order submitted",
            Some(&[("items", item_count.as_str())]),
        );

        let order = match self.submitter.submit_order(&request).await {
            Ok(order) => order,
            Err(e) => {
                warn!(error = %e, "Checkout failed");
                self.notifier.notify(Notification::new(
                    NotificationKind::Error,
                    "Your order could not be placed, please try again",
                ));
                return Err(e.into());
            }
        };

        self.cart.deduct(&lines);
        if let Err(e) = self.cart.flush().await {
            warn!(error = %e, "Failed to persist cart after checkout");
        }

        info!(order_id = %order.order_id, "Checkout complete");
        self.notifier.notify(Notification::new(
            NotificationKind::OrderPlaced,
            format!("Order {} placed", order.order_id),
        ));
        Ok(order)
    }
}

impl std::fmt::Debug for Checkout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Checkout")
            .field("cart", &self.cart)
            .finish_non_exhaustive()
    }
}

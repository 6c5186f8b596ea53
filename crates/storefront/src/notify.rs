//! User-facing notifications.
//!
//! Cart mutations and checkout outcomes produce short messages ("Ramen added
//! to cart"). Where they end up is up to the front end: a [`Notifier`] is
//! injected into the cart store and the checkout flow.

use plateful_core::CartChange;
use tokio::sync::mpsc;

/// Category of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationKind {
    /// A new line was added to the cart.
    Added,
    /// An existing line's quantity grew.
    Incremented,
    /// A line's quantity was set.
    QuantityChanged,
    /// A line was removed.
    Removed,
    /// The cart was emptied.
    Cleared,
    /// Checkout succeeded.
    OrderPlaced,
    /// Something the user asked for failed.
    Error,
}

/// A message for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
}

impl Notification {
    /// Create a notification.
    #[must_use]
    pub fn new(kind: NotificationKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Describe a cart change.
    #[must_use]
    pub fn for_change(change: &CartChange) -> Self {
        match change {
            CartChange::Added { display_name, .. } => Self::new(
                NotificationKind::Added,
                format!("{display_name} added to cart"),
            ),
            CartChange::Incremented {
                display_name,
                quantity,
                ..
            } => Self::new(
                NotificationKind::Incremented,
                format!("{display_name} quantity updated to {quantity}"),
            ),
            CartChange::QuantityChanged {
                display_name, to, ..
            } => Self::new(
                NotificationKind::QuantityChanged,
                format!("{display_name} quantity set to {to}"),
            ),
            CartChange::Removed(line) => Self::new(
                NotificationKind::Removed,
                format!("{} removed from cart", line.display_name),
            ),
            CartChange::Deducted { .. } => {
                Self::new(NotificationKind::Removed, "Ordered items removed from cart")
            }
            CartChange::Cleared { .. } => Self::new(NotificationKind::Cleared, "Cart cleared"),
        }
    }
}

/// Sink for user-facing notifications.
pub trait Notifier: Send + Sync {
    /// Deliver a notification. Must not block.
    fn notify(&self, notification: Notification);
}

/// Writes notifications to the `tracing` log.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notification: Notification) {
        match notification.kind {
            NotificationKind::Error => {
                tracing::warn!(kind = ?notification.kind, "{}", notification.message);
            }
            _ => tracing::info!(kind = ?notification.kind, "{}", notification.message),
        }
    }
}

/// Forwards notifications over a channel to whoever renders them.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    tx: mpsc::UnboundedSender<Notification>,
}

impl ChannelNotifier {
    /// Create a notifier and the receiving end of its channel.
    #[must_use]
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Notification>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl Notifier for ChannelNotifier {
    fn notify(&self, notification: Notification) {
        // A closed receiver means nobody is displaying messages anymore
        let _ = self.tx.send(notification);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use plateful_core::{CartLine, ItemId};
    use rust_decimal::Decimal;

    use super::*;

    #[test]
    fn test_messages_name_the_product() {
        let added = Notification::for_change(&CartChange::Added {
            item_id: ItemId::new("A"),
            display_name: "Ramen".to_string(),
            quantity: 1,
        });
        assert_eq!(added.kind, NotificationKind::Added);
        assert_eq!(added.message, "Ramen added to cart");

        let removed = Notification::for_change(&CartChange::Removed(CartLine {
            item_id: ItemId::new("A"),
            display_name: "Ramen".to_string(),
            unit_price: Decimal::ONE,
            image_ref: None,
            quantity: 2,
            attributes: serde_json::Map::new(),
        }));
        assert_eq!(removed.kind, NotificationKind::Removed);
        assert_eq!(removed.message, "Ramen removed from cart");
    }

    #[test]
    fn test_channel_notifier_delivers_in_order() {
        let (notifier, mut rx) = ChannelNotifier::new();
        notifier.notify(Notification::new(NotificationKind::Cleared, "one"));
        notifier.notify(Notification::new(NotificationKind::Error, "two"));

        assert_eq!(rx.try_recv().unwrap().message, "one");
        assert_eq!(rx.try_recv().unwrap().kind, NotificationKind::Error);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_channel_notifier_tolerates_dropped_receiver() {
        let (notifier, rx) = ChannelNotifier::new();
        drop(rx);
        notifier.notify(Notification::new(NotificationKind::Added, "ignored"));
    }
}

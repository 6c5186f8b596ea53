//! Optional access to the cart store.

use plateful_core::{Cart, CartChange, CartLine, ItemId, Product};
use rust_decimal::Decimal;

use super::CartStore;
use crate::storage::StorageError;

/// A cart reference that may not be connected to a store.
///
/// Code that can run before the application context exists (or outside it)
/// holds a `CartHandle` instead of a [`CartStore`]. A detached handle answers
/// every read with an empty cart and ignores every mutation, so such code
/// degrades instead of failing.
#[derive(Clone, Debug, Default)]
pub struct CartHandle {
    store: Option<CartStore>,
}

impl CartHandle {
    /// A handle backed by `store`.
    #[must_use]
    pub const fn connected(store: CartStore) -> Self {
        Self { store: Some(store) }
    }

    /// A handle with no store behind it.
    #[must_use]
    pub const fn detached() -> Self {
        Self { store: None }
    }

    /// Whether a store is behind this handle.
    #[must_use]
    pub const fn is_connected(&self) -> bool {
        self.store.is_some()
    }

    pub fn add_item(&self, product: Product) -> Option<CartChange> {
        self.store.as_ref().map(|store| store.add_item(product))
    }

    pub fn add_item_with_quantity(&self, product: Product, quantity: i64) -> Option<CartChange> {
        self.store
            .as_ref()
            .and_then(|store| store.add_item_with_quantity(product, quantity))
    }

    pub fn remove_item(&self, item_id: &ItemId) -> Option<CartChange> {
        self.store
            .as_ref()
            .and_then(|store| store.remove_item(item_id))
    }

    pub fn update_quantity(&self, item_id: &ItemId, quantity: i64) -> Option<CartChange> {
        self.store
            .as_ref()
            .and_then(|store| store.update_quantity(item_id, quantity))
    }

    pub fn clear(&self) -> Option<CartChange> {
        self.store.as_ref().and_then(CartStore::clear)
    }

    pub fn deduct(&self, ordered: &[CartLine]) -> Option<CartChange> {
        self.store.as_ref().and_then(|store| store.deduct(ordered))
    }

    #[must_use]
    pub fn snapshot(&self) -> Cart {
        self.store
            .as_ref()
            .map_or_else(Cart::new, CartStore::snapshot)
    }

    #[must_use]
    pub fn lines(&self) -> Vec<CartLine> {
        self.store
            .as_ref()
            .map_or_else(Vec::new, CartStore::lines)
    }

    #[must_use]
    pub fn line(&self, item_id: &ItemId) -> Option<CartLine> {
        self.store.as_ref().and_then(|store| store.line(item_id))
    }

    #[must_use]
    pub fn total_quantity(&self) -> u64 {
        self.store.as_ref().map_or(0, CartStore::total_quantity)
    }

    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.store
            .as_ref()
            .map_or(Decimal::ZERO, CartStore::subtotal)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.store.as_ref().is_none_or(CartStore::is_empty)
    }

    /// Persist the current lines. A detached handle has nothing to write.
    ///
    /// # Errors
    ///
    /// Returns the storage error if the write fails.
    pub async fn flush(&self) -> Result<(), StorageError> {
        match &self.store {
            Some(store) => store.flush().await,
            None => Ok(()),
        }
    }
}

impl From<CartStore> for CartHandle {
    fn from(store: CartStore) -> Self {
        Self::connected(store)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::notify::TracingNotifier;
    use crate::storage::{KeyValueStore, MemoryStore};

    fn product(id: &str) -> Product {
        Product::new(id, format!("Dish {id}"), Decimal::new(500, 2))
    }

    #[tokio::test]
    async fn test_detached_handle_is_inert() {
        let handle = CartHandle::detached();
        assert!(!handle.is_connected());

        assert!(handle.add_item(product("A")).is_none());
        assert!(handle.add_item_with_quantity(product("A"), 3).is_none());
        assert!(handle.update_quantity(&ItemId::new("A"), 2).is_none());
        assert!(handle.remove_item(&ItemId::new("A")).is_none());
        assert!(handle.clear().is_none());
        assert!(handle.deduct(&[]).is_none());

        assert!(handle.lines().is_empty());
        assert!(handle.line(&ItemId::new("A")).is_none());
        assert!(handle.is_empty());
        assert_eq!(handle.total_quantity(), 0);
        assert_eq!(handle.subtotal(), Decimal::ZERO);
        assert_eq!(handle.snapshot(), Cart::new());
        handle.flush().await.unwrap();
    }

    #[tokio::test]
    async fn test_default_is_detached() {
        assert!(!CartHandle::default().is_connected());
    }

    #[tokio::test]
    async fn test_connected_handle_delegates() {
        let storage = MemoryStore::new();
        let store = CartStore::hydrate(Arc::new(storage.clone()), Arc::new(TracingNotifier)).await;
        let handle = CartHandle::from(store.clone());

        handle.add_item(product("A"));
        handle.add_item_with_quantity(product("B"), 2);
        assert_eq!(store.total_quantity(), 3);
        assert_eq!(handle.total_quantity(), 3);
        assert_eq!(handle.subtotal(), Decimal::new(1500, 2));

        handle.flush().await.unwrap();
        assert!(storage.get("cart").await.unwrap().is_some());
    }
}

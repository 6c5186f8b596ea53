//! The session's cart store.

use std::sync::{Arc, PoisonError, RwLock, RwLockWriteGuard};

use plateful_core::{Cart, CartChange, CartLine, ItemId, Product};
use rust_decimal::Decimal;
use tokio::sync::{Mutex, watch};
use tracing::{debug, instrument, warn};

use crate::error::add_breadcrumb;
use crate::notify::{Notification, Notifier};
use crate::storage::{KeyValueStore, StorageError, keys};

/// Authoritative in-memory cart with a write-behind mirror in a
/// [`KeyValueStore`].
///
/// Mutations apply immediately and return what they did. Each one publishes a
/// snapshot of the lines to a background writer, which persists the most
/// recent snapshot under [`keys::CART`]; rapid mutations coalesce into fewer
/// writes. Persistence failures are logged and never reach the caller.
///
/// Cheap to clone; clones share the same cart.
#[derive(Clone)]
pub struct CartStore {
    inner: Arc<CartStoreInner>,
}

struct CartStoreInner {
    cart: RwLock<Cart>,
    storage: Arc<dyn KeyValueStore>,
    notifier: Arc<dyn Notifier>,
    snapshots: watch::Sender<Vec<CartLine>>,
    /// Held for the duration of every write so a flush can never be
    /// overtaken by an older background write.
    write_gate: Arc<Mutex<()>>,
}

impl CartStore {
    /// Restore the cart persisted in `storage` and start the background writer.
    ///
    /// A missing or unreadable entry yields an empty cart.
    ///
    /// Must be called within a Tokio runtime.
    #[instrument(skip_all)]
    pub async fn hydrate(storage: Arc<dyn KeyValueStore>, notifier: Arc<dyn Notifier>) -> Self {
        let cart = load_cart(storage.as_ref()).await;
        debug!(
            lines = cart.lines().len(),
            total_quantity = cart.total_quantity(),
            "Cart hydrated"
        );
        Self::with_cart(cart, storage, notifier)
    }

    /// Wrap an existing cart without reading storage.
    ///
    /// Must be called within a Tokio runtime.
    #[must_use]
    pub fn with_cart(
        cart: Cart,
        storage: Arc<dyn KeyValueStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let (snapshots, rx) = watch::channel(cart.lines().to_vec());
        let write_gate = Arc::new(Mutex::new(()));

        tokio::spawn(write_behind(Arc::clone(&storage), rx, Arc::clone(&write_gate)));

        Self {
            inner: Arc::new(CartStoreInner {
                cart: RwLock::new(cart),
                storage,
                notifier,
                snapshots,
                write_gate,
            }),
        }
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Add one unit of `product`.
    pub fn add_item(&self, product: Product) -> CartChange {
        let change = {
            let mut cart = self.write();
            let change = cart.add_item(product);
            self.publish(&cart);
            change
        };
        self.announce(&change);
        change
    }

    /// Add `quantity` units of `product`. Non-positive quantities are ignored.
    pub fn add_item_with_quantity(&self, product: Product, quantity: i64) -> Option<CartChange> {
        self.apply(|cart| cart.add_item_with_quantity(product, quantity))
    }

    /// Remove the line for `item_id`, if present.
    pub fn remove_item(&self, item_id: &ItemId) -> Option<CartChange> {
        self.apply(|cart| cart.remove_item(item_id))
    }

    /// Set the quantity of a line; zero or below removes it.
    pub fn update_quantity(&self, item_id: &ItemId, quantity: i64) -> Option<CartChange> {
        self.apply(|cart| cart.update_quantity(item_id, quantity))
    }

    /// Empty the cart.
    pub fn clear(&self) -> Option<CartChange> {
        self.apply(Cart::clear)
    }

    /// Take ordered quantities out of the cart, keeping later additions.
    pub fn deduct(&self, ordered: &[CartLine]) -> Option<CartChange> {
        self.apply(|cart| cart.deduct(ordered))
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Copy of the current cart.
    #[must_use]
    pub fn snapshot(&self) -> Cart {
        self.read(Clone::clone)
    }

    /// Current lines in insertion order.
    #[must_use]
    pub fn lines(&self) -> Vec<CartLine> {
        self.read(|cart| cart.lines().to_vec())
    }

    /// The line for `item_id`, if any.
    #[must_use]
    pub fn line(&self, item_id: &ItemId) -> Option<CartLine> {
        self.read(|cart| cart.line(item_id).cloned())
    }

    /// Sum of line quantities.
    #[must_use]
    pub fn total_quantity(&self) -> u64 {
        self.read(Cart::total_quantity)
    }

    /// Sum of line totals.
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.read(Cart::subtotal)
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.read(Cart::is_empty)
    }

    /// Watch the line list; a new value is published after every mutation.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Vec<CartLine>> {
        self.inner.snapshots.subscribe()
    }

    // =========================================================================
    // Persistence
    // =========================================================================

    /// Persist the current lines now and wait for the write.
    ///
    /// # Errors
    ///
    /// Returns the storage error if the write fails.
    #[instrument(skip(self))]
    pub async fn flush(&self) -> Result<(), StorageError> {
        let _gate = self.inner.write_gate.lock().await;
        let lines = self.inner.snapshots.borrow().clone();
        persist(self.inner.storage.as_ref(), &lines).await
    }

    fn apply(&self, mutate: impl FnOnce(&mut Cart) -> Option<CartChange>) -> Option<CartChange> {
        let change = {
            let mut cart = self.write();
            let change = mutate(&mut cart)?;
            self.publish(&cart);
            change
        };
        self.announce(&change);
        Some(change)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Cart> {
        self.inner
            .cart
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Called with the write lock held so snapshots are published in order.
    fn publish(&self, cart: &Cart) {
        self.inner.snapshots.send_replace(cart.lines().to_vec());
    }

    fn announce(&self, change: &CartChange) {
        let notification = Notification::for_change(change);
        add_breadcrumb("cart", &notification.message, None);
        self.inner.notifier.notify(notification);
    }

    fn read<T>(&self, f: impl FnOnce(&Cart) -> T) -> T {
        let cart = self
            .inner
            .cart
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        f(&cart)
    }
}

impl std::fmt::Debug for CartStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartStore")
            .field("cart", &self.snapshot())
            .finish_non_exhaustive()
    }
}

/// Read and decode the persisted cart, falling back to empty.
async fn load_cart(storage: &dyn KeyValueStore) -> Cart {
    match storage.get(keys::CART).await {
        Ok(Some(raw)) => serde_json::from_str::<Cart>(&raw).unwrap_or_else(|e| {
            warn!(error = %e, "Persisted cart is unreadable, starting empty");
            Cart::new()
        }),
        Ok(None) => Cart::new(),
        Err(e) => {
            warn!(error = %e, "Failed to read persisted cart, starting empty");
            Cart::new()
        }
    }
}

async fn persist(storage: &dyn KeyValueStore, lines: &[CartLine]) -> Result<(), StorageError> {
    let json = serde_json::to_string(lines)?;
    storage.set(keys::CART, &json).await
}

/// Background writer: persists the latest snapshot whenever one is published.
///
/// Exits once every [`CartStore`] clone is dropped and the last snapshot is
/// written.
async fn write_behind(
    storage: Arc<dyn KeyValueStore>,
    mut rx: watch::Receiver<Vec<CartLine>>,
    write_gate: Arc<Mutex<()>>,
) {
    while rx.changed().await.is_ok() {
        let _gate = write_gate.lock().await;
        let lines = rx.borrow_and_update().clone();
        if let Err(e) = persist(storage.as_ref(), &lines).await {
            warn!(error = %e, "Failed to persist cart");
        }
    }
    debug!("Cart writer stopped");
}

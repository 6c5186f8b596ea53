//! Cart line items and the pure cart reducer.
//!
//! [`Cart`] owns the ordered list of [`CartLine`]s and applies the cart
//! mutations. It does no I/O; persistence and notifications are layered on
//! top by the storefront's cart store, which turns each returned
//! [`CartChange`] into a user-facing message.
//!
//! Invariants:
//! - at most one line per [`ItemId`]
//! - every stored line has `quantity >= 1`
//! - the total quantity is always derived from the lines

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::types::ItemId;

/// A product as offered by the menu, before it has a quantity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Menu item identifier.
    pub item_id: ItemId,
    /// Human-readable name.
    pub display_name: String,
    /// Price per unit.
    #[serde(with = "rust_decimal::serde::float")]
    pub unit_price: Decimal,
    /// Image URL or asset reference.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_ref: Option<String>,
    /// Catalog attributes carried along untouched.
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl Product {
    /// Create a product with no image and no extra attributes.
    #[must_use]
    pub fn new(item_id: impl Into<ItemId>, display_name: impl Into<String>, unit_price: Decimal) -> Self {
        Self {
            item_id: item_id.into(),
            display_name: display_name.into(),
            unit_price,
            image_ref: None,
            attributes: Map::new(),
        }
    }
}

/// One product currently in the cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    /// Menu item identifier; also the identity of the line.
    pub item_id: ItemId,
    /// Name shown to the user. Not authoritative.
    pub display_name: String,
    /// Unit price snapshot taken when the item was added.
    #[serde(with = "rust_decimal::serde::float")]
    pub unit_price: Decimal,
    /// Image URL or asset reference.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_ref: Option<String>,
    /// Number of units. Always at least 1.
    pub quantity: u32,
    /// Catalog attributes carried along untouched.
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

/// Keys a line serializes itself; pass-through attributes may not reuse them.
const LINE_FIELDS: [&str; 5] = ["itemId", "displayName", "unitPrice", "imageRef", "quantity"];

impl CartLine {
    fn from_product(product: Product, quantity: u32) -> Self {
        let mut attributes = product.attributes;
        attributes.retain(|key, _| !LINE_FIELDS.contains(&key.as_str()));
        Self {
            item_id: product.item_id,
            display_name: product.display_name,
            unit_price: product.unit_price,
            image_ref: product.image_ref,
            quantity,
            attributes,
        }
    }

    /// Price of the whole line.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// What a cart mutation did.
#[derive(Debug, Clone, PartialEq)]
pub enum CartChange {
    /// A new line was inserted.
    Added {
        item_id: ItemId,
        display_name: String,
        quantity: u32,
    },
    /// An existing line's quantity grew.
    Incremented {
        item_id: ItemId,
        display_name: String,
        quantity: u32,
    },
    /// An existing line's quantity was set to a new positive value.
    QuantityChanged {
        item_id: ItemId,
        display_name: String,
        from: u32,
        to: u32,
    },
    /// A line was removed.
    Removed(CartLine),
    /// Ordered quantities were taken out and some lines remain.
    Deducted {
        /// Number of lines the order touched.
        lines: usize,
    },
    /// All lines were dropped.
    Cleared {
        /// Number of lines that were in the cart.
        lines: usize,
    },
}

/// The cart: an ordered set of lines keyed by item id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<CartLine>", into = "Vec<CartLine>")]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { lines: Vec::new() }
    }

    /// Build a cart from restored lines, repairing anything that breaks the
    /// invariants: zero-quantity lines are dropped and repeated item ids are
    /// merged into the first occurrence.
    #[must_use]
    pub fn from_lines(lines: Vec<CartLine>) -> Self {
        let mut cart = Self::new();
        for line in lines.into_iter().filter(|line| line.quantity > 0) {
            match cart.position(&line.item_id) {
                Some(pos) => {
                    if let Some(existing) = cart.lines.get_mut(pos) {
                        existing.quantity = existing.quantity.saturating_add(line.quantity);
                    }
                }
                None => cart.lines.push(line),
            }
        }
        cart
    }

    /// Lines in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Look up the line for an item.
    #[must_use]
    pub fn line(&self, item_id: &ItemId) -> Option<&CartLine> {
        self.lines.iter().find(|line| &line.item_id == item_id)
    }

    /// Sum of all line quantities.
    #[must_use]
    pub fn total_quantity(&self) -> u64 {
        self.lines.iter().map(|line| u64::from(line.quantity)).sum()
    }

    /// Sum of all line totals.
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Add one unit of a product.
    pub fn add_item(&mut self, product: Product) -> CartChange {
        self.add(product, 1)
    }

    /// Add `quantity` units of a product. Non-positive quantities are ignored.
    pub fn add_item_with_quantity(&mut self, product: Product, quantity: i64) -> Option<CartChange> {
        if quantity <= 0 {
            return None;
        }
        Some(self.add(product, clamp_quantity(quantity)))
    }

    /// Remove the line for an item, if present.
    pub fn remove_item(&mut self, item_id: &ItemId) -> Option<CartChange> {
        let pos = self.position(item_id)?;
        Some(CartChange::Removed(self.lines.remove(pos)))
    }

    /// Set a line's quantity. Non-positive quantities remove the line; setting
    /// the current quantity is a no-op.
    pub fn update_quantity(&mut self, item_id: &ItemId, quantity: i64) -> Option<CartChange> {
        if quantity <= 0 {
            return self.remove_item(item_id);
        }
        let to = clamp_quantity(quantity);
        let line = self.lines.iter_mut().find(|line| &line.item_id == item_id)?;
        if line.quantity == to {
            return None;
        }
        let from = std::mem::replace(&mut line.quantity, to);
        Some(CartChange::QuantityChanged {
            item_id: line.item_id.clone(),
            display_name: line.display_name.clone(),
            from,
            to,
        })
    }

    /// Drop every line. Returns `None` when the cart was already empty.
    pub fn clear(&mut self) -> Option<CartChange> {
        if self.lines.is_empty() {
            return None;
        }
        let lines = self.lines.len();
        self.lines.clear();
        Some(CartChange::Cleared { lines })
    }

    /// Take the quantities of `ordered` out of the cart, dropping lines that
    /// reach zero. Anything added after the order was built stays.
    ///
    /// Returns [`CartChange::Cleared`] when nothing is left, and `None` when no
    /// ordered item is in the cart anymore.
    pub fn deduct(&mut self, ordered: &[CartLine]) -> Option<CartChange> {
        let before = self.lines.len();
        let mut touched = 0;
        for placed in ordered {
            if let Some(line) = self
                .lines
                .iter_mut()
                .find(|line| line.item_id == placed.item_id)
            {
                line.quantity = line.quantity.saturating_sub(placed.quantity);
                touched += 1;
            }
        }
        if touched == 0 {
            return None;
        }

        self.lines.retain(|line| line.quantity > 0);
        if self.lines.is_empty() {
            Some(CartChange::Cleared { lines: before })
        } else {
            Some(CartChange::Deducted { lines: touched })
        }
    }

    fn add(&mut self, product: Product, quantity: u32) -> CartChange {
        if let Some(line) = self
            .lines
            .iter_mut()
            .find(|line| line.item_id == product.item_id)
        {
            line.quantity = line.quantity.saturating_add(quantity);
            return CartChange::Incremented {
                item_id: line.item_id.clone(),
                display_name: line.display_name.clone(),
                quantity: line.quantity,
            };
        }

        let line = CartLine::from_product(product, quantity);
        let change = CartChange::Added {
            item_id: line.item_id.clone(),
            display_name: line.display_name.clone(),
            quantity,
        };
        self.lines.push(line);
        change
    }

    fn position(&self, item_id: &ItemId) -> Option<usize> {
        self.lines.iter().position(|line| &line.item_id == item_id)
    }
}

impl From<Vec<CartLine>> for Cart {
    fn from(lines: Vec<CartLine>) -> Self {
        Self::from_lines(lines)
    }
}

impl From<Cart> for Vec<CartLine> {
    fn from(cart: Cart) -> Self {
        cart.lines
    }
}

/// Positive request quantities larger than a line can hold saturate.
fn clamp_quantity(quantity: i64) -> u32 {
    u32::try_from(quantity).unwrap_or(u32::MAX)
}

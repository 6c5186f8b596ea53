//! Cache types for menu responses.

use plateful_core::ItemId;

use super::types::MenuItem;

/// Cache key for menu lookups.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum CacheKey {
    Menu { category: Option<String> },
    Item(ItemId),
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Menu(Vec<MenuItem>),
    Item(Box<MenuItem>),
}

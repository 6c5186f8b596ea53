//! Device-local key-value persistence.
//!
//! The cart and the signed-in session are mirrored into a [`KeyValueStore`].
//! Values are opaque strings (the callers store JSON or plain ids).
//!
//! # Backends
//!
//! - [`MemoryStore`] - in-process map, for tests and throwaway sessions
//! - [`FileStore`] - one file per key under a data directory

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use async_trait::async_trait;
use thiserror::Error;

/// Keys used by the storefront.
pub mod keys {
    /// Serialized cart line list.
    pub const CART: &str = "cart";

    /// Signed-in user identifier.
    pub const USER_ID: &str = "userId";

    /// Role of the signed-in user.
    pub const USER_ROLE: &str = "userRole";
}

/// Errors that can occur while reading or writing persisted values.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Underlying I/O failed.
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A value could not be encoded for storage.
    #[error("failed to encode value: {0}")]
    Encode(#[from] serde_json::Error),

    /// The key cannot be mapped onto the backend.
    #[error("invalid storage key: {0:?}")]
    InvalidKey(String),
}

/// Asynchronous string key-value store.
///
/// Implementations must be `Send + Sync`; the cart store writes from a
/// background task.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read a value. A missing key is `Ok(None)`, not an error.
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write a value, replacing any previous one.
    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete a value. Deleting a missing key succeeds.
    async fn remove(&self, key: &str) -> Result<(), StorageError>;
}

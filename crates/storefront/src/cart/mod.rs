//! Shared cart state for the running session.
//!
//! - [`CartStore`] - the one cart instance, persisted write-behind
//! - [`CartHandle`] - optional access that degrades to an empty cart

mod handle;
mod store;

pub use handle::CartHandle;
pub use store::CartStore;

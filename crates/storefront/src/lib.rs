//! Plateful storefront library.
//!
//! Everything a front end needs to run a food-ordering session:
//!
//! - [`cart`] - the session's cart store, mirrored into local storage
//! - [`storage`] - device-local key-value persistence
//! - [`api`] - client for the ordering backend (menu, orders, reviews, admin)
//! - [`checkout`] - turning the cart into an order
//! - [`session`] - the signed-in user
//! - [`context`] - the composition root tying these together
//!
//! # Example
//!
//! ```rust,ignore
//! use plateful_storefront::{AppContext, StorefrontConfig};
//!
//! let ctx = AppContext::new(StorefrontConfig::from_env()?).await?;
//! let ramen = ctx.api().get_menu_item(&"ramen".into()).await?;
//! ctx.cart().add_item(ramen.to_product());
//! ctx.flush().await?;
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod cart;
pub mod checkout;
pub mod config;
pub mod context;
pub mod error;
pub mod notify;
pub mod session;
pub mod storage;

pub use config::StorefrontConfig;
pub use context::AppContext;
pub use error::{Result, StorefrontError};

//! Plateful Core - Shared types and cart logic.
//!
//! This crate provides the types used across all Plateful components:
//! - `storefront` - Cart store, persistence, backend API client, checkout
//! - `cli` - Command-line front end
//!
//! # Architecture
//!
//! The core crate contains only types and pure logic - no I/O, no storage
//! access, no HTTP clients. This keeps it lightweight and allows it to be
//! used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, prices, ratings, and statuses
//! - [`cart`] - Cart lines and the cart reducer

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod types;

pub use cart::{Cart, CartChange, CartLine, Product};
pub use types::*;

//! Cozy Furniture Core - Catalog and wishlist library.
//!
//! This crate provides the behavior shared by every Cozy Furniture component:
//! - `storefront` - Public-facing JSON API over the CMS catalog
//! - `cli` - Command-line tools for migrations and offline catalog queries
//!
//! # Architecture
//!
//! The core crate contains only types, pure functions, and traits - no HTTP
//! clients, no database access. Persistence is reached through the
//! [`wishlist::WishlistStorage`] trait so the storefront can plug in its
//! session store and tests can use [`wishlist::MemoryStorage`].
//!
//! # Modules
//!
//! - [`types`] - Products, reference entities, type-safe IDs, and emails
//! - [`catalog`] - Filter, sort, and paginate over an in-memory catalog
//! - [`wishlist`] - Persisted wishlist store with toast notifications

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod catalog;
pub mod types;
pub mod wishlist;

pub use types::*;

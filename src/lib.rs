//! Storefront Cache - read-through caching for a file-backed product catalog
//!
//! Serves products and categories from a two-tier cache (remote Redis REST or
//! local memory with an optional persistent tier), repopulating from the
//! `products/<category>/<id>/product.json` tree on a miss and invalidating
//! affected keys after admin writes.

pub mod api;
pub mod cache;
pub mod catalog;
pub mod config;
pub mod error;
pub mod models;

pub use api::AppState;
pub use cache::{CacheBackend, CacheKey, CacheService};
pub use catalog::{Catalog, Product, ProductStore};
pub use config::Config;

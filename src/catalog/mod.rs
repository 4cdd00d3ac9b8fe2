//! Catalog Module
//!
//! The file-backed product catalog and the cache-aware accessors the HTTP
//! layer calls.

mod product;
mod repository;
mod store;

pub use product::Product;
pub use repository::Catalog;
pub use store::{ProductStore, PRODUCT_DATA_FILE};

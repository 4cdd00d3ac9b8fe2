//! API Module
//!
//! HTTP handlers and routing for the storefront catalog.
//!
//! # Endpoints
//! - `GET /api/products`, `/api/categories`, `/api/products/:category[/:id]`
//! - `GET /images/:category/:id/:file`
//! - `/admin/...` - Product writes and cache invalidation (bearer token)
//! - `GET /stats`, `GET /health`

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;

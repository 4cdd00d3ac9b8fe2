//! API Routes
//!
//! Configures the Axum router with the storefront and admin endpoints.

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    admin_product_handler, category_products_handler, delete_product_handler, health_handler,
    image_handler, invalidate_category_handler, list_categories_handler, list_products_handler,
    product_handler, require_admin, save_product_handler, stats_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /health` - Health check endpoint
/// - `GET /stats` - Cache statistics
/// - `GET /api/products` - All products
/// - `GET /api/categories` - Category names
/// - `GET /api/products/:category` - Products in one category
/// - `GET /api/products/:category/:id` - One product
/// - `GET /images/:category/:id/:file` - Product image
/// - `GET|PUT|DELETE /admin/products/:category/:id` - Admin product access
/// - `POST /admin/cache/categories/:category/invalidate` - Manual invalidation
///
/// # Middleware
/// - Admin guard on `/admin/*`: bearer token
/// - CORS: Allows any origin
/// - Tracing: Logs all requests
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let admin = Router::new()
        .route(
            "/admin/products/:category/:id",
            get(admin_product_handler)
                .put(save_product_handler)
                .delete(delete_product_handler),
        )
        .route(
            "/admin/cache/categories/:category/invalidate",
            post(invalidate_category_handler),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), require_admin));

    Router::new()
        .route("/health", get(health_handler))
        .route("/stats", get(stats_handler))
        .route("/api/products", get(list_products_handler))
        .route("/api/categories", get(list_categories_handler))
        .route("/api/products/:category", get(category_products_handler))
        .route("/api/products/:category/:id", get(product_handler))
        .route("/images/:category/:id/:file", get(image_handler))
        .merge(admin)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

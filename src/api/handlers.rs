//! API Handlers
//!
//! HTTP request handlers for the storefront and admin endpoints.

use std::sync::Arc;

use axum::{
    extract::{Path, Request, State},
    http::header,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use tracing::warn;

use crate::cache::{create_backend, CacheService, SystemClock};
use crate::catalog::{Catalog, Product, ProductStore};
use crate::config::Config;
use crate::error::ApiError;
use crate::models::{
    DeleteResponse, HealthResponse, InvalidateResponse, SaveProductRequest, StatsResponse,
};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Cache-aware catalog
    pub catalog: Catalog,
    /// Shared secret for admin routes
    pub admin_token: Option<Arc<str>>,
}

impl AppState {
    /// Creates a new AppState around an existing catalog.
    pub fn new(catalog: Catalog, admin_token: Option<String>) -> Self {
        Self {
            catalog,
            admin_token: admin_token.map(Arc::from),
        }
    }

    /// Creates a new AppState from configuration.
    ///
    /// Picks the cache backend (remote if reachable, local otherwise) once.
    pub async fn from_config(config: &Config) -> Self {
        let backend = create_backend(&config.cache_config(), Arc::new(SystemClock)).await;
        let cache = Arc::new(CacheService::new(backend));
        let catalog = Catalog::new(cache, ProductStore::new(&config.products_dir));
        Self::new(catalog, config.admin_token.clone())
    }
}

// == Admin Guard ==
/// Middleware for admin routes: requires `Authorization: Bearer <token>`.
pub async fn require_admin(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(expected) = state.admin_token.as_deref() else {
        warn!("Admin request rejected: no admin token configured");
        return Err(ApiError::Unauthorized);
    };

    let provided = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "));

    if provided != Some(expected) {
        return Err(ApiError::Unauthorized);
    }

    Ok(next.run(request).await)
}

// == Storefront ==
/// Handler for GET /api/products
pub async fn list_products_handler(State(state): State<AppState>) -> Json<Vec<Product>> {
    Json(state.catalog.get_all_products().await)
}

/// Handler for GET /api/categories
pub async fn list_categories_handler(State(state): State<AppState>) -> Json<Vec<String>> {
    Json(state.catalog.get_categories().await)
}

/// Handler for GET /api/products/:category
pub async fn category_products_handler(
    State(state): State<AppState>,
    Path(category): Path<String>,
) -> Json<Vec<Product>> {
    Json(state.catalog.get_products_by_category(&category).await)
}

/// Handler for GET /api/products/:category/:id
pub async fn product_handler(
    State(state): State<AppState>,
    Path((category, id)): Path<(String, String)>,
) -> Result<Json<Product>, ApiError> {
    find_product(&state, &category, &id, false).await
}

/// Handler for GET /images/:category/:id/:file
pub async fn image_handler(
    State(state): State<AppState>,
    Path((category, id, file)): Path<(String, String, String)>,
) -> Result<Response, ApiError> {
    let bytes = state
        .catalog
        .get_product_image(&category, &id, &file)
        .await
        .ok_or_else(|| ApiError::NotFound(format!("{}/{}/{}", category, id, file)))?;

    let content_type = mime_guess::from_path(&file)
        .first_or_octet_stream()
        .to_string();

    Ok(([(header::CONTENT_TYPE, content_type)], bytes).into_response())
}

// == Admin ==
/// Handler for GET /admin/products/:category/:id
///
/// Always rereads the data file.
pub async fn admin_product_handler(
    State(state): State<AppState>,
    Path((category, id)): Path<(String, String)>,
) -> Result<Json<Product>, ApiError> {
    find_product(&state, &category, &id, true).await
}

/// Handler for PUT /admin/products/:category/:id
///
/// Writes the product, invalidates the affected cache keys and returns the
/// freshly read record.
pub async fn save_product_handler(
    State(state): State<AppState>,
    Path((category, id)): Path<(String, String)>,
    Json(req): Json<SaveProductRequest>,
) -> Result<Json<Product>, ApiError> {
    if let Some(error_msg) = req.validate() {
        return Err(ApiError::InvalidRequest(error_msg));
    }

    let product = req.into_product(category, id);
    let saved = state.catalog.save_product(&product).await?;

    saved.map(Json).ok_or_else(|| {
        ApiError::Internal(format!(
            "Product '{}/{}' could not be read back",
            product.category, product.id
        ))
    })
}

/// Handler for DELETE /admin/products/:category/:id
pub async fn delete_product_handler(
    State(state): State<AppState>,
    Path((category, id)): Path<(String, String)>,
) -> Result<Json<DeleteResponse>, ApiError> {
    if !state.catalog.delete_product(&category, &id).await? {
        return Err(ApiError::NotFound(format!("{}/{}", category, id)));
    }

    Ok(Json(DeleteResponse::new(category, id)))
}

/// Handler for POST /admin/cache/categories/:category/invalidate
pub async fn invalidate_category_handler(
    State(state): State<AppState>,
    Path(category): Path<String>,
) -> Json<InvalidateResponse> {
    state.catalog.invalidate_category_cache(&category).await;
    Json(InvalidateResponse::new(category))
}

// == Service ==
/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let cache = state.catalog.cache();
    Json(StatsResponse::new(cache.backend_kind(), &cache.stats()))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

async fn find_product(
    state: &AppState,
    category: &str,
    id: &str,
    force_refresh: bool,
) -> Result<Json<Product>, ApiError> {
    state
        .catalog
        .get_product(category, id, force_refresh)
        .await
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("{}/{}", category, id)))
}

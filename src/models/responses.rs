//! Response DTOs for the storefront API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;

use crate::cache::{BackendKind, CacheStats};

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    /// Which backend is serving the cache
    pub backend: BackendKind,
    /// Number of cache hits
    pub hits: u64,
    /// Number of cache misses
    pub misses: u64,
    /// Number of cache writes
    pub writes: u64,
    /// Number of invalidated keys
    pub invalidations: u64,
    /// Number of corrupted payloads discarded
    pub corrupted: u64,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
}

impl StatsResponse {
    /// Creates a new StatsResponse from cache statistics
    pub fn new(backend: BackendKind, stats: &CacheStats) -> Self {
        Self {
            backend,
            hits: stats.hits,
            misses: stats.misses,
            writes: stats.writes,
            invalidations: stats.invalidations,
            corrupted: stats.corrupted,
            hit_rate: stats.hit_rate(),
        }
    }
}

/// Response body for DELETE /admin/products/:category/:id
#[derive(Debug, Clone, Serialize)]
pub struct DeleteResponse {
    /// Success message
    pub message: String,
    pub category: String,
    pub id: String,
}

impl DeleteResponse {
    pub fn new(category: impl Into<String>, id: impl Into<String>) -> Self {
        let category = category.into();
        let id = id.into();
        Self {
            message: format!("Product '{}/{}' deleted successfully", category, id),
            category,
            id,
        }
    }
}

/// Response body for a manual cache invalidation
#[derive(Debug, Clone, Serialize)]
pub struct InvalidateResponse {
    /// Success message
    pub message: String,
    /// The category whose cache entries were dropped
    pub category: String,
}

impl InvalidateResponse {
    pub fn new(category: impl Into<String>) -> Self {
        let category = category.into();
        Self {
            message: format!("Cache for category '{}' invalidated", category),
            category,
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

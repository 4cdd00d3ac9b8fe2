//! Cache Service Module
//!
//! Typed facade over the string backend: JSON for structured payloads,
//! base64 for binary images.

use std::sync::Arc;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, error, warn};

use crate::cache::backend::{BackendKind, CacheBackend, SetStatus};
use crate::cache::stats::{CacheStats, StatsRecorder};
use crate::cache::TtlClass;
use crate::error::CacheError;

/// TTL used by [`CacheService::cache_data`] when none is given.
pub const DEFAULT_DATA_TTL: u64 = 60 * 60;

// == Cache Service ==
/// Process-wide cache handle, constructed once and shared via `Arc`.
pub struct CacheService {
    backend: Arc<dyn CacheBackend>,
    stats: StatsRecorder,
}

impl std::fmt::Debug for CacheService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheService")
            .field("backend", &self.backend.kind())
            .field("stats", &self.stats)
            .finish()
    }
}

impl CacheService {
    pub fn new(backend: Arc<dyn CacheBackend>) -> Self {
        Self {
            backend,
            stats: StatsRecorder::new(),
        }
    }

    pub fn backend(&self) -> &Arc<dyn CacheBackend> {
        &self.backend
    }

    pub fn backend_kind(&self) -> BackendKind {
        self.backend.kind()
    }

    pub fn stats(&self) -> CacheStats {
        self.stats.snapshot()
    }

    // == Structured Data ==
    /// Serializes `value` as JSON and stores it (default TTL: one hour).
    pub async fn cache_data<T: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &T,
        ttl_seconds: Option<u64>,
    ) {
        let payload = match serde_json::to_string(value) {
            Ok(payload) => payload,
            Err(e) => {
                error!(key, error = %e, "Failed to serialize cache payload");
                return;
            }
        };

        self.store(key, payload, ttl_seconds.unwrap_or(DEFAULT_DATA_TTL))
            .await;
    }

    /// Returns the decoded payload, or None on a miss.
    ///
    /// A payload that no longer decodes as `T` is deleted.
    pub async fn get_cached_data<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let Some(payload) = self.backend.get(key).await else {
            debug!(key, "Cache miss");
            self.stats.record_miss();
            return None;
        };

        match serde_json::from_str(&payload) {
            Ok(value) => {
                debug!(key, "Cache hit");
                self.stats.record_hit();
                Some(value)
            }
            Err(e) => {
                self.discard_corrupted(key, e.into()).await;
                None
            }
        }
    }

    /// Deletes `key`. Deleting an absent key is a no-op.
    pub async fn invalidate_cache(&self, key: &str) {
        self.backend.del(key).await;
        self.stats.record_invalidation();
        debug!(key, "Cache key invalidated");
    }

    // == Images ==
    /// Stores binary image bytes as base64 (default TTL: one day).
    pub async fn cache_image(&self, key: &str, bytes: &[u8], ttl_seconds: Option<u64>) {
        let payload = STANDARD.encode(bytes);
        self.store(key, payload, ttl_seconds.unwrap_or(TtlClass::Image.seconds()))
            .await;
    }

    pub async fn get_cached_image(&self, key: &str) -> Option<Vec<u8>> {
        let Some(payload) = self.backend.get(key).await else {
            self.stats.record_miss();
            return None;
        };

        match STANDARD.decode(payload.as_bytes()) {
            Ok(bytes) => {
                self.stats.record_hit();
                Some(bytes)
            }
            Err(e) => {
                self.discard_corrupted(key, e.into()).await;
                None
            }
        }
    }

    pub async fn is_image_cached(&self, key: &str) -> bool {
        self.backend.exists(key).await
    }

    // == Helpers ==
    async fn store(&self, key: &str, payload: String, ttl_seconds: u64) {
        match self.backend.set(key, payload, Some(ttl_seconds)).await {
            SetStatus::Ok => self.stats.record_write(),
            SetStatus::Error => warn!(key, "Cache write was not stored"),
        }
    }

    async fn discard_corrupted(&self, key: &str, err: CacheError) {
        warn!(key, error = %err, "Corrupted cache payload, deleting key");
        self.stats.record_corruption();
        self.stats.record_miss();
        self.backend.del(key).await;
    }
}

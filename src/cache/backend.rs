//! Backing Store Adapter Module
//!
//! The string-only key-value contract shared by the remote backend and the
//! local fallback, plus the factory that picks one at startup.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use tracing::{info, warn};

use crate::cache::{Clock, FileStorage, LocalCache, RemoteBackend};

// == Set Status ==
/// Outcome of a `set` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetStatus {
    Ok,
    Error,
}

impl SetStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SetStatus::Ok => "OK",
            SetStatus::Error => "ERROR",
        }
    }
}

impl fmt::Display for SetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// == Backend Kind ==
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    Remote,
    InMemory,
}

// == Cache Backend Trait ==
/// Key-value operations with TTL support.
///
/// Implementations never return errors: failures are logged and reported as
/// a miss, a no-op or `SetStatus::Error`.
#[async_trait]
pub trait CacheBackend: Send + Sync {
    fn kind(&self) -> BackendKind;

    /// Stores `value`; with a TTL the entry expires `ttl_seconds * 1000` ms from now.
    async fn set(&self, key: &str, value: String, ttl_seconds: Option<u64>) -> SetStatus;

    /// Returns the value, or None if absent or expired.
    async fn get(&self, key: &str) -> Option<String>;

    async fn exists(&self, key: &str) -> bool;

    /// Unconditional removal.
    async fn del(&self, key: &str);
}

// == Cache Config ==
/// Settings consumed by [`create_backend`].
#[derive(Debug, Clone, Default)]
pub struct CacheConfig {
    /// Redis REST endpoint
    pub remote_url: Option<String>,
    /// Redis REST bearer token
    pub remote_token: Option<String>,
    /// Directory for the persistent local tier
    pub storage_dir: Option<PathBuf>,
}

impl CacheConfig {
    /// Returns the credential pair when both halves are present and non-empty.
    pub fn remote_credentials(&self) -> Option<(&str, &str)> {
        let url = self.remote_url.as_deref().filter(|v| !v.trim().is_empty())?;
        let token = self.remote_token.as_deref().filter(|v| !v.trim().is_empty())?;
        Some((url, token))
    }
}

// == Factory ==
/// Builds the local cache, with its persistent tier when configured.
pub async fn create_local_cache(config: &CacheConfig, clock: Arc<dyn Clock>) -> LocalCache {
    match config.storage_dir.as_ref() {
        Some(dir) => match FileStorage::open(dir).await {
            Ok(storage) => {
                info!(dir = %dir.display(), "Local cache persistent tier enabled");
                LocalCache::with_persistent(clock, Box::new(storage))
            }
            Err(e) => {
                warn!(dir = %dir.display(), error = %e, "Cannot open persistent tier, using memory only");
                LocalCache::new(clock)
            }
        },
        None => LocalCache::new(clock),
    }
}

/// Chooses the backend once, by credential presence.
///
/// With credentials a connection is attempted; if it fails the local cache
/// is used for the lifetime of the process.
pub async fn create_backend(config: &CacheConfig, clock: Arc<dyn Clock>) -> Arc<dyn CacheBackend> {
    let local = create_local_cache(config, clock).await;

    let Some((url, token)) = config.remote_credentials() else {
        info!("No remote cache credentials, using in-memory cache");
        return Arc::new(local);
    };

    match RemoteBackend::connect(url, token, local).await {
        Ok(remote) => {
            info!(url, "Connected to remote cache");
            Arc::new(remote)
        }
        Err((e, local)) => {
            warn!(url, error = %e, "Remote cache unavailable, falling back to in-memory cache");
            Arc::new(local)
        }
    }
}

//! Local Fallback Cache Module
//!
//! In-process expiring map with an optional persistent tier. Used on its own
//! when no remote backend is configured, and embedded in the remote backend
//! as its fallback.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::cache::backend::{BackendKind, CacheBackend, SetStatus};
use crate::cache::{CacheEntry, Clock, PersistentStorage};

/// The in-memory backend is the local cache itself.
pub type InMemoryBackend = LocalCache;

// == Local Cache ==
/// Two-tier local cache: memory first, then the persistent tier.
///
/// Expiry is lazy: an entry is checked on every read and purged from both
/// tiers once its expiry has passed. There is no sweeper.
#[derive(Debug)]
pub struct LocalCache {
    /// Key-value storage
    entries: Mutex<HashMap<String, CacheEntry>>,
    /// Optional persistent mirror
    persistent: Option<Box<dyn PersistentStorage>>,
    clock: Arc<dyn Clock>,
}

impl LocalCache {
    // == Constructor ==
    /// Creates a memory-only cache.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            persistent: None,
            clock,
        }
    }

    /// Creates a cache mirrored into `storage`.
    pub fn with_persistent(clock: Arc<dyn Clock>, storage: Box<dyn PersistentStorage>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            persistent: Some(storage),
            clock,
        }
    }

    // == Length ==
    /// Returns the number of entries held in memory, expired ones included
    /// until they are next read.
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }

    // == Lookup ==
    /// Finds a live entry, promoting it from the persistent tier if needed.
    async fn lookup(&self, key: &str) -> Option<String> {
        let now = self.clock.now_ms();
        let mut entries = self.entries.lock().await;

        if let Some(entry) = entries.get(key) {
            if entry.is_expired_at(now) {
                debug!(key, "Local cache entry expired");
                entries.remove(key);
                self.persistent_remove(key).await;
                return None;
            }
            return Some(entry.data.clone());
        }

        let entry = self.persistent_load(key).await?;
        if entry.is_expired_at(now) {
            debug!(key, "Persisted cache entry expired");
            self.persistent_remove(key).await;
            return None;
        }

        debug!(key, "Promoting persisted entry into memory");
        let data = entry.data.clone();
        entries.insert(key.to_string(), entry);
        Some(data)
    }

    // == Persistent Tier Helpers ==
    async fn persistent_load(&self, key: &str) -> Option<CacheEntry> {
        let storage = self.persistent.as_ref()?;

        let raw = match storage.get_item(key).await {
            Ok(raw) => raw?,
            Err(e) => {
                warn!(key, error = %e, "Persistent tier read failed");
                return None;
            }
        };

        match serde_json::from_str::<CacheEntry>(&raw) {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!(key, error = %e, "Corrupted persisted entry, removing");
                self.persistent_remove(key).await;
                None
            }
        }
    }

    async fn persistent_store(&self, key: &str, entry: &CacheEntry) {
        let Some(storage) = self.persistent.as_ref() else {
            return;
        };

        let result = match serde_json::to_string(entry) {
            Ok(raw) => storage.set_item(key, &raw).await,
            Err(e) => Err(e.into()),
        };
        if let Err(e) = result {
            warn!(key, error = %e, "Persistent tier write failed, keeping entry in memory only");
        }
    }

    async fn persistent_remove(&self, key: &str) {
        if let Some(storage) = self.persistent.as_ref() {
            if let Err(e) = storage.remove_item(key).await {
                warn!(key, error = %e, "Persistent tier delete failed");
            }
        }
    }
}

#[async_trait]
impl CacheBackend for LocalCache {
    fn kind(&self) -> BackendKind {
        BackendKind::InMemory
    }

    async fn set(&self, key: &str, value: String, ttl_seconds: Option<u64>) -> SetStatus {
        let entry = CacheEntry::new(value, ttl_seconds, self.clock.now_ms());
        let mut entries = self.entries.lock().await;
        self.persistent_store(key, &entry).await;
        entries.insert(key.to_string(), entry);
        SetStatus::Ok
    }

    async fn get(&self, key: &str) -> Option<String> {
        self.lookup(key).await
    }

    async fn exists(&self, key: &str) -> bool {
        self.lookup(key).await.is_some()
    }

    async fn del(&self, key: &str) {
        let mut entries = self.entries.lock().await;
        entries.remove(key);
        self.persistent_remove(key).await;
    }
}

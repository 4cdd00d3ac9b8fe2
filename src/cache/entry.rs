//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL support.

use serde::{Deserialize, Serialize};

// == Cache Entry ==
/// A stored payload plus its optional expiry.
///
/// Serialized as `{"data": ..., "expiry": ...}` when mirrored into the
/// persistent tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// The stored value (JSON text or base64 for images)
    pub data: String,
    /// Expiration timestamp (Unix milliseconds), None = no expiration
    pub expiry: Option<u64>,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new cache entry written at `now_ms` with optional TTL.
    ///
    /// # Arguments
    /// * `data` - The value to store
    /// * `ttl_seconds` - Optional TTL in seconds
    /// * `now_ms` - Write time in Unix milliseconds
    pub fn new(data: String, ttl_seconds: Option<u64>, now_ms: u64) -> Self {
        let expiry = ttl_seconds.map(|ttl| now_ms.saturating_add(ttl.saturating_mul(1000)));

        Self { data, expiry }
    }

    // == Is Expired ==
    /// Checks if the entry has expired at `now_ms`.
    ///
    /// Boundary condition: an entry is expired once the current time is
    /// greater than or equal to its expiry.
    pub fn is_expired_at(&self, now_ms: u64) -> bool {
        match self.expiry {
            Some(expiry) => now_ms >= expiry,
            None => false,
        }
    }

    // == Time To Live ==
    /// Returns remaining TTL in milliseconds, or None if no expiration is set.
    pub fn ttl_remaining_ms(&self, now_ms: u64) -> Option<u64> {
        self.expiry.map(|expiry| expiry.saturating_sub(now_ms))
    }
}

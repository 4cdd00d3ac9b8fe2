//! Cache Module
//!
//! Two-tier caching with TTL expiration: a remote Redis REST backend or a
//! local in-memory cache with an optional persistent tier, behind a typed
//! JSON facade.

mod backend;
mod clock;
mod entry;
mod keys;
mod local;
mod persistent;
mod remote;
mod service;
mod stats;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use backend::{
    create_backend, create_local_cache, BackendKind, CacheBackend, CacheConfig, SetStatus,
};
pub use clock::{current_timestamp_ms, Clock, ManualClock, SystemClock};
pub use entry::CacheEntry;
pub use keys::{CacheKey, TtlClass};
pub use local::{InMemoryBackend, LocalCache};
pub use persistent::{FileStorage, PersistentStorage};
pub use remote::RemoteBackend;
pub use service::{CacheService, DEFAULT_DATA_TTL};
pub use stats::{CacheStats, StatsRecorder};

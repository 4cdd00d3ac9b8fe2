//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;
use std::path::PathBuf;

use crate::cache::CacheConfig;

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Root of the `<category>/<id>/product.json` tree
    pub products_dir: PathBuf,
    /// HTTP server port
    pub server_port: u16,
    /// Redis REST endpoint; selects the remote backend together with the token
    pub redis_url: Option<String>,
    /// Redis REST bearer token
    pub redis_token: Option<String>,
    /// Directory for the persistent local cache tier
    pub cache_storage_dir: Option<PathBuf>,
    /// Shared secret for admin routes; admin routes are closed when unset
    pub admin_token: Option<String>,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `PRODUCTS_DIR` - Product tree root (default: ./products)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `UPSTASH_REDIS_REST_URL` / `UPSTASH_REDIS_REST_TOKEN` - Remote cache credentials
    /// - `CACHE_STORAGE_DIR` - Persistent local cache directory (optional)
    /// - `ADMIN_TOKEN` - Admin shared secret (optional)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            products_dir: env::var("PRODUCTS_DIR")
                .ok()
                .filter(|v| !v.is_empty())
                .map(PathBuf::from)
                .unwrap_or(defaults.products_dir),
            server_port: env::var("SERVER_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.server_port),
            redis_url: non_empty_var("UPSTASH_REDIS_REST_URL"),
            redis_token: non_empty_var("UPSTASH_REDIS_REST_TOKEN"),
            cache_storage_dir: non_empty_var("CACHE_STORAGE_DIR").map(PathBuf::from),
            admin_token: non_empty_var("ADMIN_TOKEN"),
        }
    }

    /// Settings for the cache backend factory.
    pub fn cache_config(&self) -> CacheConfig {
        CacheConfig {
            remote_url: self.redis_url.clone(),
            remote_token: self.redis_token.clone(),
            storage_dir: self.cache_storage_dir.clone(),
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

impl Default for Config {
    fn default() -> Self {
        Self {
            products_dir: PathBuf::from("./products"),
            server_port: 3000,
            redis_url: None,
            redis_token: None,
            cache_storage_dir: None,
            admin_token: None,
        }
    }
}

//! Remote Backend Module
//!
//! Client for a Redis service exposed over the Upstash-style REST protocol:
//! each command is a JSON array POSTed to the endpoint with a bearer token,
//! answered by `{"result": ...}` or `{"error": "..."}`.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, error};

use crate::cache::backend::{BackendKind, CacheBackend, SetStatus};
use crate::cache::LocalCache;
use crate::error::{CacheError, Result};

// == Wire Types ==
#[derive(Debug, Deserialize)]
struct RestReply {
    #[serde(default)]
    result: Value,
    #[serde(default)]
    error: Option<String>,
}

// == Remote Backend ==
/// Remote cache with a local fallback used whenever a call fails.
#[derive(Debug)]
pub struct RemoteBackend {
    client: reqwest::Client,
    url: String,
    token: String,
    fallback: LocalCache,
}

impl RemoteBackend {
    // == Connect ==
    /// Checks connectivity with `PING` before handing out a backend.
    ///
    /// On failure the fallback cache is returned alongside the error so the
    /// caller can keep using it.
    pub async fn connect(
        url: &str,
        token: &str,
        fallback: LocalCache,
    ) -> std::result::Result<Self, (CacheError, LocalCache)> {
        let backend = Self {
            client: reqwest::Client::new(),
            url: url.trim_end_matches('/').to_string(),
            token: token.to_string(),
            fallback,
        };

        let ping = backend.command(json!(["PING"])).await;
        match ping {
            Ok(Value::String(reply)) if reply == "PONG" => Ok(backend),
            Ok(other) => Err((
                CacheError::Backend(format!("unexpected PING reply: {}", other)),
                backend.fallback,
            )),
            Err(e) => Err((e, backend.fallback)),
        }
    }

    /// The local cache used while the remote service is failing.
    pub fn fallback(&self) -> &LocalCache {
        &self.fallback
    }

    // == Command ==
    /// Sends one command and returns its `result` value.
    async fn command(&self, args: Value) -> Result<Value> {
        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.token)
            .json(&args)
            .send()
            .await?;

        let status = response.status();
        let reply: RestReply = response.json().await?;

        if let Some(message) = reply.error {
            return Err(CacheError::Backend(message));
        }
        if !status.is_success() {
            return Err(CacheError::Backend(format!("unexpected status {}", status)));
        }

        Ok(reply.result)
    }

    async fn remote_get(&self, key: &str) -> Result<Option<String>> {
        match self.command(json!(["GET", key])).await? {
            Value::Null => Ok(None),
            Value::String(value) => Ok(Some(value)),
            other => Err(CacheError::Backend(format!("unexpected GET reply: {}", other))),
        }
    }
}

#[async_trait]
impl CacheBackend for RemoteBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Remote
    }

    async fn set(&self, key: &str, value: String, ttl_seconds: Option<u64>) -> SetStatus {
        let args = match ttl_seconds {
            Some(ttl) => json!(["SET", key, &value, "EX", ttl]),
            None => json!(["SET", key, &value]),
        };

        match self.command(args).await {
            Ok(Value::String(reply)) if reply == "OK" => SetStatus::Ok,
            Ok(other) => {
                error!(key, reply = %other, "Remote cache rejected SET");
                SetStatus::Error
            }
            Err(e) => {
                error!(key, error = %e, "Remote cache SET failed, writing to local fallback");
                self.fallback.set(key, value, ttl_seconds).await
            }
        }
    }

    async fn get(&self, key: &str) -> Option<String> {
        match self.remote_get(key).await {
            Ok(value) => value,
            Err(e) => {
                error!(key, error = %e, "Remote cache GET failed, reading local fallback");
                self.fallback.get(key).await
            }
        }
    }

    async fn exists(&self, key: &str) -> bool {
        match self.command(json!(["EXISTS", key])).await {
            Ok(Value::Number(count)) => count.as_u64().unwrap_or(0) > 0,
            Ok(other) => {
                error!(key, reply = %other, "Unexpected EXISTS reply, reading local fallback");
                self.fallback.exists(key).await
            }
            Err(e) => {
                error!(key, error = %e, "Remote cache EXISTS failed, reading local fallback");
                self.fallback.exists(key).await
            }
        }
    }

    async fn del(&self, key: &str) {
        if let Err(e) = self.command(json!(["DEL", key])).await {
            error!(key, error = %e, "Remote cache DEL failed");
        } else {
            debug!(key, "Remote cache key deleted");
        }
        self.fallback.del(key).await;
    }
}

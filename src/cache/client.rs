//! Cache client used by the HTTP handlers.
//!
//! # Error policy
//! - `get` / `delete` / `health_check` never return errors; failures are
//!   logged and reported through [`Lookup::Unavailable`] or a DOWN status
//! - `set` propagates every failure, including "not connected"

use std::sync::Arc;

use serde_json::Value;

use crate::cache::backend::{CacheBackend, CacheError};
use crate::cache::redis::RedisClusterBackend;
use crate::config::CacheConfig;
use crate::health::{HealthDetail, HealthStatus};

/// Outcome of a read-path cache operation.
///
/// `NotFound` and `Unavailable` are distinct here so they can be logged
/// differently; callers at the HTTP boundary treat both as a negative result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup<T> {
    Found(T),
    NotFound,
    Unavailable(String),
}

impl<T> Lookup<T> {
    pub fn is_found(&self) -> bool {
        matches!(self, Lookup::Found(_))
    }

    /// Collapse to an `Option`, discarding the failure reason.
    pub fn found(self) -> Option<T> {
        match self {
            Lookup::Found(value) => Some(value),
            Lookup::NotFound | Lookup::Unavailable(_) => None,
        }
    }
}

/// Handle on the cache cluster, shared by all requests.
#[derive(Clone)]
pub struct CacheClient {
    backend: Option<Arc<dyn CacheBackend>>,
}

impl CacheClient {
    /// Connect to the Redis cluster. A failed bootstrap is logged and
    /// produces a disconnected client rather than an error.
    pub async fn connect(config: &CacheConfig) -> Self {
        match RedisClusterBackend::connect(config).await {
            Ok(backend) => {
                tracing::info!(nodes = ?config.nodes, "Redis cluster connected");
                Self::with_backend(Arc::new(backend))
            }
            Err(e) => {
                tracing::error!(nodes = ?config.nodes, error = %e, "Failed to connect to Redis");
                Self::disconnected()
            }
        }
    }

    pub fn with_backend(backend: Arc<dyn CacheBackend>) -> Self {
        Self {
            backend: Some(backend),
        }
    }

    pub fn disconnected() -> Self {
        Self { backend: None }
    }

    pub fn is_connected(&self) -> bool {
        self.backend.is_some()
    }

    pub async fn get(&self, key: &str) -> Lookup<String> {
        let Some(backend) = &self.backend else {
            return Lookup::Unavailable(CacheError::NotConnected.to_string());
        };

        match backend.get(key).await {
            Ok(Some(value)) => {
                tracing::debug!(key, found = true, "Cache GET");
                Lookup::Found(value)
            }
            Ok(None) => {
                tracing::debug!(key, found = false, "Cache GET");
                Lookup::NotFound
            }
            Err(e) => {
                tracing::error!(key, error = %e, "Cache GET error");
                Lookup::Unavailable(e.to_string())
            }
        }
    }

    /// Store `value` under `key`. Strings are stored verbatim, any other
    /// JSON value as its JSON text.
    pub async fn set(&self, key: &str, value: &Value, ttl_secs: u64) -> Result<(), CacheError> {
        let backend = self.backend.as_ref().ok_or(CacheError::NotConnected)?;
        let stored = stored_form(value);

        match backend.set_ex(key, &stored, ttl_secs).await {
            Ok(()) => {
                tracing::debug!(key, ttl = ttl_secs, "Cache SET");
                Ok(())
            }
            Err(e) => {
                tracing::error!(key, error = %e, "Cache SET error");
                Err(e)
            }
        }
    }

    /// Delete `key`. `Found(())` means at least one key was removed.
    pub async fn delete(&self, key: &str) -> Lookup<()> {
        let Some(backend) = &self.backend else {
            return Lookup::Unavailable(CacheError::NotConnected.to_string());
        };

        match backend.del(key).await {
            Ok(removed) => {
                tracing::debug!(key, deleted = removed > 0, "Cache DELETE");
                if removed > 0 {
                    Lookup::Found(())
                } else {
                    Lookup::NotFound
                }
            }
            Err(e) => {
                tracing::error!(key, error = %e, "Cache DELETE error");
                Lookup::Unavailable(e.to_string())
            }
        }
    }

    pub async fn health_check(&self) -> HealthStatus {
        let Some(backend) = &self.backend else {
            return HealthStatus::down("Not connected");
        };

        match backend.ping().await {
            Ok(reply) => HealthStatus::up(HealthDetail::Response(reply)),
            Err(e) => HealthStatus::down(e.to_string()),
        }
    }
}

/// Text written to the cache for a JSON value.
pub fn stored_form(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MapBackend {
        entries: Mutex<HashMap<String, (String, u64)>>,
    }

    #[async_trait]
    impl CacheBackend for MapBackend {
        async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
            Ok(self.entries.lock().unwrap().get(key).map(|(v, _)| v.clone()))
        }

        async fn set_ex(&self, key: &str, value: &str, ttl_secs: u64) -> Result<(), CacheError> {
            self.entries
                .lock()
                .unwrap()
                .insert(key.to_string(), (value.to_string(), ttl_secs));
            Ok(())
        }

        async fn del(&self, key: &str) -> Result<u64, CacheError> {
            Ok(self.entries.lock().unwrap().remove(key).map_or(0, |_| 1))
        }

        async fn ping(&self) -> Result<String, CacheError> {
            Ok("PONG".to_string())
        }
    }

    struct BrokenBackend;

    #[async_trait]
    impl CacheBackend for BrokenBackend {
        async fn get(&self, _key: &str) -> Result<Option<String>, CacheError> {
            Err(CacheError::Backend("connection reset".into()))
        }

        async fn set_ex(&self, _key: &str, _value: &str, _ttl: u64) -> Result<(), CacheError> {
            Err(CacheError::Backend("connection reset".into()))
        }

        async fn del(&self, _key: &str) -> Result<u64, CacheError> {
            Err(CacheError::Backend("connection reset".into()))
        }

        async fn ping(&self) -> Result<String, CacheError> {
            Err(CacheError::Backend("connection reset".into()))
        }
    }

    #[test]
    fn stored_form_of_values() {
        assert_eq!(stored_form(&json!("plain")), "plain");
        assert_eq!(stored_form(&json!({"a": 1})), r#"{"a":1}"#);
        assert_eq!(stored_form(&json!([1, 2])), "[1,2]");
        assert_eq!(stored_form(&json!(42)), "42");
        assert_eq!(stored_form(&json!(true)), "true");
    }

    #[tokio::test]
    async fn set_get_delete() {
        let backend = Arc::new(MapBackend::default());
        let client = CacheClient::with_backend(backend.clone());

        assert_eq!(client.get("k").await, Lookup::NotFound);

        client.set("k", &json!({"n": 1}), 60).await.unwrap();
        assert_eq!(client.get("k").await, Lookup::Found(r#"{"n":1}"#.to_string()));
        assert_eq!(backend.entries.lock().unwrap()["k"].1, 60);

        assert!(client.delete("k").await.is_found());
        assert_eq!(client.delete("k").await, Lookup::NotFound);
        assert_eq!(client.get("k").await.found(), None);
    }

    #[tokio::test]
    async fn backend_failures_degrade_reads_and_fail_writes() {
        let client = CacheClient::with_backend(Arc::new(BrokenBackend));

        assert!(matches!(client.get("k").await, Lookup::Unavailable(_)));
        assert!(matches!(client.delete("k").await, Lookup::Unavailable(_)));
        assert!(client.set("k", &json!("v"), 60).await.is_err());

        let health = client.health_check().await;
        assert!(!health.is_up());
        assert_eq!(
            health.detail,
            HealthDetail::Error("cache backend error: connection reset".into())
        );
    }

    #[tokio::test]
    async fn disconnected_client() {
        let client = CacheClient::disconnected();
        assert!(!client.is_connected());
        assert!(matches!(client.get("k").await, Lookup::Unavailable(_)));
        assert!(matches!(
            client.set("k", &json!("v"), 60).await,
            Err(CacheError::NotConnected)
        ));
        assert_eq!(client.health_check().await, HealthStatus::down("Not connected"));
    }

    #[tokio::test]
    async fn healthy_backend_reports_pong() {
        let client = CacheClient::with_backend(Arc::new(MapBackend::default()));
        assert_eq!(
            client.health_check().await,
            HealthStatus::up(HealthDetail::Response("PONG".into()))
        );
    }
}

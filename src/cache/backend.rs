//! Backend abstraction over the key/value store.

use async_trait::async_trait;
use thiserror::Error;

/// Errors raised by cache operations.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Redis not connected")]
    NotConnected,
    #[error("redis error: {0}")]
    Redis(#[from] ::redis::RedisError),
    #[error("cache backend error: {0}")]
    Backend(String),
}

/// Minimal command set the service needs from a cache cluster.
#[async_trait]
pub trait CacheBackend: Send + Sync {
    /// Fetch a string value.
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Store a value with an expiry in seconds.
    async fn set_ex(&self, key: &str, value: &str, ttl_secs: u64) -> Result<(), CacheError>;

    /// Delete a key, returning how many keys were removed.
    async fn del(&self, key: &str) -> Result<u64, CacheError>;

    /// Liveness probe. Returns the server's reply.
    async fn ping(&self) -> Result<String, CacheError>;
}

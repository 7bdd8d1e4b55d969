//! Redis cluster backend.
//!
//! Slot routing, redirects, and reconnects are handled by the `redis`
//! crate's async cluster connection; this type only issues commands.

use async_trait::async_trait;
use redis::cluster::ClusterClient;
use redis::cluster_async::ClusterConnection;
use redis::AsyncCommands;

use crate::cache::backend::{CacheBackend, CacheError};
use crate::config::CacheConfig;

/// Cache backend over a shared, multiplexed cluster connection.
#[derive(Clone)]
pub struct RedisClusterBackend {
    connection: ClusterConnection,
}

impl RedisClusterBackend {
    /// Bootstrap the cluster from the configured seed nodes.
    pub async fn connect(config: &CacheConfig) -> Result<Self, CacheError> {
        let nodes = config.nodes.iter().map(|node| format!("redis://{node}"));
        let mut builder = ClusterClient::builder(nodes);
        if let Some(password) = config.password() {
            builder = builder.password(password.to_string());
        }

        let client = builder.build()?;
        let connection = client.get_async_connection().await?;

        Ok(Self { connection })
    }
}

#[async_trait]
impl CacheBackend for RedisClusterBackend {
    #[tracing::instrument(name = "redis.get", skip(self), fields(db.system = "redis"))]
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let mut conn = self.connection.clone();
        let value: Option<String> = conn.get(key).await?;
        Ok(value)
    }

    #[tracing::instrument(name = "redis.set", skip(self, value), fields(db.system = "redis"))]
    async fn set_ex(&self, key: &str, value: &str, ttl_secs: u64) -> Result<(), CacheError> {
        let mut conn = self.connection.clone();
        let _: () = conn.set_ex(key, value, ttl_secs).await?;
        Ok(())
    }

    #[tracing::instrument(name = "redis.del", skip(self), fields(db.system = "redis"))]
    async fn del(&self, key: &str) -> Result<u64, CacheError> {
        let mut conn = self.connection.clone();
        let removed: u64 = conn.del(key).await?;
        Ok(removed)
    }

    #[tracing::instrument(name = "redis.ping", skip(self), fields(db.system = "redis"))]
    async fn ping(&self) -> Result<String, CacheError> {
        let mut conn = self.connection.clone();
        let reply: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(reply)
    }
}

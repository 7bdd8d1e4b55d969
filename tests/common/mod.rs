//! Shared utilities for integration testing.
//!
//! In-memory stand-ins for the cache and broker plus a helper that runs
//! the real HTTP server on an ephemeral port.

#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use was7::cache::{CacheBackend, CacheClient, CacheError};
use was7::config::AppConfig;
use was7::http::HttpServer;
use was7::lifecycle::Shutdown;
use was7::messaging::{MessageBroker, MessageClient, MessagingError, OutboundMessage};
use was7::observability::metrics;

/// Cache backend holding entries in a map. TTLs are recorded, not enforced.
#[derive(Default)]
pub struct MemoryCache {
    pub entries: Mutex<HashMap<String, (String, u64)>>,
}

#[async_trait]
impl CacheBackend for MemoryCache {
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

/// Cache backend whose every call fails.
pub struct FailingCache;

#[async_trait]
impl CacheBackend for FailingCache {
    async fn get(&self, _key: &str) -> Result<Option<String>, CacheError> {
        Err(CacheError::Backend("cluster down".into()))
    }

    async fn set_ex(&self, _key: &str, _value: &str, _ttl: u64) -> Result<(), CacheError> {
        Err(CacheError::Backend("cluster down".into()))
    }

    async fn del(&self, _key: &str) -> Result<u64, CacheError> {
        Err(CacheError::Backend("cluster down".into()))
    }

    async fn ping(&self) -> Result<String, CacheError> {
        Err(CacheError::Backend("cluster down".into()))
    }
}

/// Broker that keeps every queued record.
#[derive(Default)]
pub struct RecordingBroker {
    pub sent: Mutex<Vec<OutboundMessage>>,
}

#[async_trait]
impl MessageBroker for RecordingBroker {
    fn enqueue(&self, message: OutboundMessage) -> Result<(), MessagingError> {
        self.sent.lock().unwrap().push(message);
        Ok(())
    }

    async fn topic_count(&self) -> Result<usize, MessagingError> {
        Ok(2)
    }
}

pub struct TestServer {
    pub addr: SocketAddr,
    pub shutdown: Arc<Shutdown>,
    pub handle: JoinHandle<std::io::Result<()>>,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub async fn stop(self) {
        self.shutdown.trigger();
        let _ = self.handle.await;
    }
}

pub fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.listener.bind_address = "127.0.0.1:0".to_string();
    config.observability.tracing_enabled = false;
    config
}

/// Start the server with the given clients on an ephemeral port.
pub async fn spawn_server(config: AppConfig, cache: CacheClient, messages: MessageClient) -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let recorder = metrics::install_recorder().unwrap();

    let shutdown = Arc::new(Shutdown::new());
    let server = HttpServer::new(Arc::new(config), cache, messages, recorder);
    let handle = tokio::spawn(server.run(listener, shutdown.subscribe()));

    TestServer {
        addr,
        shutdown,
        handle,
    }
}

/// Server backed by a working in-memory cache and a recording broker.
pub async fn spawn_healthy() -> (TestServer, Arc<MemoryCache>, Arc<RecordingBroker>) {
    let cache = Arc::new(MemoryCache::default());
    let broker = Arc::new(RecordingBroker::default());
    let config = test_config();
    let source = config.service.name.clone();

    let server = spawn_server(
        config,
        CacheClient::with_backend(cache.clone()),
        MessageClient::with_broker(broker.clone(), &source),
    )
    .await;

    (server, cache, broker)
}

/// Value of the first rendered sample line matching `name` and all `labels`.
pub fn sample_value(rendered: &str, name: &str, labels: &[(&str, &str)]) -> Option<f64> {
    rendered
        .lines()
        .filter(|line| !line.starts_with('#'))
        .filter(|line| line.starts_with(&format!("{name}{{")))
        .find(|line| {
            labels
                .iter()
                .all(|(k, v)| line.contains(&format!("{k}=\"{v}\"")))
        })
        .and_then(|line| line.rsplit(' ').next())
        .and_then(|value| value.parse().ok())
}

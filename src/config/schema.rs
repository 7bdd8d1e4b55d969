//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the service.
//! All types derive Serde traits for deserialization from config files, and
//! every field has a default so an empty file (or no file) is valid.

use serde::{Deserialize, Serialize};

/// Root configuration for the service.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Listener configuration (bind address, timeouts, limits).
    pub listener: ListenerConfig,

    /// Service identity reported in responses, envelopes, and spans.
    pub service: ServiceConfig,

    /// Redis cluster settings.
    pub cache: CacheConfig,

    /// Kafka producer settings.
    pub messaging: MessagingConfig,

    /// Logging and tracing settings.
    pub observability: ObservabilityConfig,

    /// Runtime worker thread count. `None` derives it from the CPU count.
    pub workers: Option<usize>,
}

impl AppConfig {
    /// Worker threads to start: the configured count, or `2 * cpus + 1`.
    pub fn worker_count(&self) -> usize {
        self.workers.unwrap_or_else(|| {
            let cpus = std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1);
            cpus * 2 + 1
        })
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:5000").
    pub bind_address: String,

    /// Total time allowed for one request/response in seconds.
    pub request_timeout_secs: u64,

    /// Time allowed for in-flight requests to drain on shutdown.
    pub graceful_timeout_secs: u64,

    /// Maximum accepted request body in bytes.
    pub max_body_bytes: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:5000".to_string(),
            request_timeout_secs: 30,
            graceful_timeout_secs: 30,
            max_body_bytes: 2 * 1024 * 1024,
        }
    }
}

/// Service identity.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub name: String,
    pub namespace: String,
    pub environment: String,
    /// Deployment flavour reported by `/api/info`.
    pub runtime_type: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: "was-7".to_string(),
            namespace: "nginx-test".to_string(),
            environment: "development".to_string(),
            runtime_type: "kubernetes-docker-runtime".to_string(),
        }
    }
}

/// Redis cluster configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Seed nodes as `host:port`.
    pub nodes: Vec<String>,

    /// Cluster password. `None` (or empty) disables AUTH.
    pub password: Option<String>,

    /// TTL applied when a write does not name one.
    pub default_ttl_secs: u64,
}

impl CacheConfig {
    /// Password with empty strings treated as unset.
    pub fn password(&self) -> Option<&str> {
        self.password.as_deref().filter(|p| !p.is_empty())
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            nodes: vec![
                "redis-1:6379".to_string(),
                "redis-2:6379".to_string(),
                "redis-3:6379".to_string(),
            ],
            password: None,
            default_ttl_secs: 3600,
        }
    }
}

/// Kafka producer configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MessagingConfig {
    /// Bootstrap brokers as `host:port`.
    pub brokers: Vec<String>,

    /// Topic used when a publish request does not name one.
    pub default_topic: String,

    /// Producer `acks` setting.
    pub acks: String,

    /// Producer-level retry count.
    pub retries: u32,

    /// Producer-level backoff between retries in milliseconds.
    pub retry_backoff_ms: u64,

    /// Timeout for the cluster metadata probe used by health checks.
    pub metadata_timeout_secs: u64,
}

impl MessagingConfig {
    /// Brokers joined into a `bootstrap.servers` value.
    pub fn bootstrap_servers(&self) -> String {
        self.brokers.join(",")
    }
}

impl Default for MessagingConfig {
    fn default() -> Self {
        Self {
            brokers: vec![
                "kafka-1:9092".to_string(),
                "kafka-2:9092".to_string(),
                "kafka-3:9092".to_string(),
            ],
            default_topic: "nginx-test-events".to_string(),
            acks: "all".to_string(),
            retries: 3,
            retry_backoff_ms: 100,
            metadata_timeout_secs: 5,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Pretty,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(LogFormat::Json),
            "pretty" | "text" => Ok(LogFormat::Pretty),
            other => Err(format!("unknown log format '{other}'")),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log line format.
    pub log_format: LogFormat,

    /// Export spans over OTLP.
    pub tracing_enabled: bool,

    /// OTLP/gRPC collector endpoint.
    pub otlp_endpoint: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Json,
            tracing_enabled: true,
            otlp_endpoint: "http://jaeger:4317".to_string(),
        }
    }
}

//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters, histograms)
//!     → tracing.rs (spans exported over OTLP)
//!
//! Consumers:
//!     → Log aggregation (stdout, JSON lines)
//!     → Metrics endpoint (Prometheus scrape of GET /metrics)
//!     → Distributed tracing (OTLP collector, e.g. Jaeger)
//! ```
//!
//! # Design Decisions
//! - Request ID flows through spans, log lines, and response headers
//! - Metrics are cheap (atomic increments behind the `metrics` facade)
//! - The subscriber and exporter are installed once per process

pub mod logging;
pub mod metrics;
pub mod tracing;

use thiserror::Error;

pub use self::logging::{init_telemetry, TelemetryGuard};

/// Errors raised while installing observability components.
#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("failed to build OTLP exporter: {0}")]
    Exporter(String),
    #[error("failed to install tracing subscriber: {0}")]
    Subscriber(#[from] tracing_subscriber::util::TryInitError),
    #[error("failed to install metrics recorder: {0}")]
    Metrics(String),
    #[error("telemetry already initialized")]
    AlreadyInitialized,
}

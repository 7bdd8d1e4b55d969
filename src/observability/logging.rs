//! Structured logging and telemetry installation.
//!
//! # Responsibilities
//! - Install the global `tracing` subscriber exactly once
//! - Bridge spans into OpenTelemetry when tracing export is enabled
//! - Flush pending spans on shutdown via [`TelemetryGuard`]
//!
//! # Design Decisions
//! - JSON lines by default, pretty output for local development
//! - `RUST_LOG` takes precedence over the configured log level

use std::sync::OnceLock;

use opentelemetry::trace::TracerProvider as _;
use opentelemetry_sdk::trace::SdkTracerProvider;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::config::{AppConfig, LogFormat};
use crate::observability::tracing::build_tracer_provider;
use crate::observability::TelemetryError;

static TELEMETRY_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Keeps the tracer provider alive; shutting it down flushes queued spans.
pub struct TelemetryGuard {
    provider: Option<SdkTracerProvider>,
}

impl TelemetryGuard {
    pub fn tracing_enabled(&self) -> bool {
        self.provider.is_some()
    }
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        if let Some(provider) = self.provider.take() {
            if let Err(e) = provider.shutdown() {
                tracing::warn!(error = %e, "Tracer provider shutdown failed");
            }
        }
    }
}

/// Install logging and, if enabled, span export.
///
/// Must be called from within a Tokio runtime when tracing is enabled.
pub fn init_telemetry(config: &AppConfig) -> Result<TelemetryGuard, TelemetryError> {
    if TELEMETRY_INITIALIZED.set(()).is_err() {
        return Err(TelemetryError::AlreadyInitialized);
    }

    let observability = &config.observability;

    let provider = if observability.tracing_enabled {
        Some(build_tracer_provider(
            &config.service,
            &observability.otlp_endpoint,
        )?)
    } else {
        None
    };

    let otel_layer = provider.as_ref().map(|p| {
        tracing_opentelemetry::layer().with_tracer(p.tracer(env!("CARGO_PKG_NAME")))
    });

    let fmt_layer = match observability.log_format {
        LogFormat::Json => fmt::layer()
            .json()
            .flatten_event(true)
            .with_current_span(true)
            .with_span_list(false)
            .boxed(),
        LogFormat::Pretty => fmt::layer().with_target(true).boxed(),
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(&observability.log_level)));

    tracing_subscriber::registry()
        .with(otel_layer)
        .with(fmt_layer)
        .with(filter)
        .try_init()?;

    tracing::info!(
        service = %config.service.name,
        environment = %config.service.environment,
        log_level = %observability.log_level,
        tracing_enabled = observability.tracing_enabled,
        otlp_endpoint = %observability.otlp_endpoint,
        "Telemetry initialized"
    );

    Ok(TelemetryGuard { provider })
}

/// Filter directives for `level`, keeping transport crates quiet.
fn default_directives(level: &str) -> String {
    format!("{level},h2=warn,hyper=warn,hyper_util=warn,tonic=warn,tower=warn")
}

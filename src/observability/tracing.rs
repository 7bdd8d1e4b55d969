//! Distributed tracing support.
//!
//! # Responsibilities
//! - Build the OTLP span exporter and tracer provider
//! - Extract W3C trace context from incoming requests
//! - Create one span per HTTP request, parented on the caller's trace
//!
//! Cache and broker calls open child spans through `#[instrument]` on
//! their backend methods.

use std::time::Duration;

use axum::http::{HeaderMap, Request, Response};
use opentelemetry::propagation::Extractor;
use opentelemetry::{global, KeyValue};
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::propagation::TraceContextPropagator;
use opentelemetry_sdk::trace::SdkTracerProvider;
use opentelemetry_sdk::Resource;
use tower_http::trace::OnResponse;
use tracing::Span;
use tracing_opentelemetry::OpenTelemetrySpanExt;

use crate::config::ServiceConfig;
use crate::http::request::request_id;
use crate::observability::TelemetryError;

/// Build a batch-exporting tracer provider and register it globally.
///
/// Must run inside a Tokio runtime: the gRPC channel is created lazily on it.
pub fn build_tracer_provider(
    service: &ServiceConfig,
    endpoint: &str,
) -> Result<SdkTracerProvider, TelemetryError> {
    global::set_text_map_propagator(TraceContextPropagator::new());

    let resource = Resource::builder()
        .with_service_name(service.name.clone())
        .with_attributes([
            KeyValue::new("service.namespace", service.namespace.clone()),
            KeyValue::new("deployment.environment", service.environment.clone()),
        ])
        .build();

    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(endpoint)
        .build()
        .map_err(|e| TelemetryError::Exporter(e.to_string()))?;

    let provider = SdkTracerProvider::builder()
        .with_batch_exporter(exporter)
        .with_resource(resource)
        .build();

    global::set_tracer_provider(provider.clone());
    Ok(provider)
}

struct HeaderExtractor<'a>(&'a HeaderMap);

impl Extractor for HeaderExtractor<'_> {
    fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(|v| v.to_str().ok())
    }

    fn keys(&self) -> Vec<&str> {
        self.0.keys().map(|k| k.as_str()).collect()
    }
}

/// Span for one inbound HTTP request.
pub fn http_request_span<B>(request: &Request<B>) -> Span {
    let request_id = request_id(request).unwrap_or_default();

    let span = tracing::info_span!(
        "http_request",
        http.method = %request.method(),
        http.target = %request.uri().path(),
        request_id = %request_id,
        http.status_code = tracing::field::Empty,
    );

    let parent = global::get_text_map_propagator(|propagator| {
        propagator.extract(&HeaderExtractor(request.headers()))
    });
    span.set_parent(parent);

    span
}

/// Response hook that fills `http.status_code` on the request span.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordResponseStatus;

impl<B> OnResponse<B> for RecordResponseStatus {
    fn on_response(self, response: &Response<B>, latency: Duration, span: &Span) {
        span.record("http.status_code", response.status().as_u16());
        tracing::debug!(
            status = response.status().as_u16(),
            latency_ms = latency.as_millis() as u64,
            "Response sent"
        );
    }
}

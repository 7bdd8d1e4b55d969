//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (request ID, tracing, request metrics, body limit,
//!   timeout)
//! - Bind server to listener and drain on shutdown

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{HeaderName, HeaderValue, Request};
use axum::routing::{get, post};
use axum::{middleware, Router};
use metrics_exporter_prometheus::PrometheusHandle;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::cache::CacheClient;
use crate::config::AppConfig;
use crate::http::middleware::track_request;
use crate::http::request::{propagate_request_id_layer, set_request_id_layer, X_SERVICE};
use crate::http::{cache, diagnostics, message, system};
use crate::messaging::MessageClient;
use crate::observability::metrics;
use crate::observability::tracing::{http_request_span, RecordResponseStatus};

const METRICS_UPKEEP_INTERVAL: Duration = Duration::from_secs(5);

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub cache: CacheClient,
    pub messages: MessageClient,
    pub metrics: PrometheusHandle,
}

/// HTTP server for the demo service.
pub struct HttpServer {
    router: Router,
    config: Arc<AppConfig>,
    metrics: PrometheusHandle,
}

impl HttpServer {
    pub fn new(
        config: Arc<AppConfig>,
        cache: CacheClient,
        messages: MessageClient,
        metrics: PrometheusHandle,
    ) -> Self {
        let state = AppState {
            config: Arc::clone(&config),
            cache,
            messages,
            metrics: metrics.clone(),
        };

        let router = Self::build_router(&config, state);
        Self {
            router,
            config,
            metrics,
        }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &AppConfig, state: AppState) -> Router {
        let api = Router::new()
            .route("/api/info", get(system::info))
            .route(
                "/api/cache/{key}",
                get(cache::get_entry)
                    .put(cache::put_entry)
                    .delete(cache::delete_entry),
            )
            .route("/api/message", post(message::publish))
            .route("/api/slow", get(diagnostics::slow))
            .route("/api/error", get(diagnostics::error));

        // Falls back to a generic value if the name is not a valid header.
        let service = HeaderValue::from_str(&config.service.name)
            .unwrap_or_else(|_| HeaderValue::from_static("was-7"));

        // ServiceBuilder order is outermost first.
        let layers = ServiceBuilder::new()
            .layer(SetResponseHeaderLayer::overriding(
                HeaderName::from_static(X_SERVICE),
                service,
            ))
            .layer(set_request_id_layer())
            .layer(propagate_request_id_layer())
            .layer(
                TraceLayer::new_for_http()
                    .make_span_with(|request: &Request<Body>| http_request_span(request))
                    .on_response(RecordResponseStatus),
            )
            .layer(middleware::from_fn(track_request))
            .layer(RequestBodyLimitLayer::new(config.listener.max_body_bytes))
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.listener.request_timeout_secs,
            )));

        Router::new()
            .route("/health", get(system::health))
            .route("/metrics", get(system::metrics))
            .merge(api)
            .with_state(state)
            .layer(layers)
    }

    /// Run the server until `shutdown` fires, then drain in-flight requests.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            service = %self.config.service.name,
            "HTTP server starting"
        );

        let _upkeep = metrics::spawn_upkeep(self.metrics.clone(), METRICS_UPKEEP_INTERVAL);

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Draining in-flight requests");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }
}

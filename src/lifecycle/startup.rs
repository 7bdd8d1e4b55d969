//! Startup orchestration.
//!
//! # Responsibilities
//! - Build the worker runtime
//! - Connect the cache and message broker clients
//! - Install the metrics recorder and bind the listener
//! - Serve until a shutdown signal, then drain and flush
//!
//! # Design Decisions
//! - Listener binds last (traffic only when ready)
//! - Unreachable dependencies do not stop startup

use std::future::Future;
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use metrics_exporter_prometheus::PrometheusHandle;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::runtime::{Handle, Runtime};
use tokio::task::JoinError;

use crate::cache::CacheClient;
use crate::config::AppConfig;
use crate::http::HttpServer;
use crate::lifecycle::shutdown::Shutdown;
use crate::lifecycle::signals;
use crate::messaging::MessageClient;
use crate::observability::{metrics, TelemetryError};

const PRODUCER_FLUSH_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to build runtime: {0}")]
    Runtime(#[source] io::Error),
    #[error(transparent)]
    Telemetry(#[from] TelemetryError),
    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: io::Error,
    },
    #[error("server error: {0}")]
    Serve(#[source] io::Error),
}

/// Multi-threaded runtime with `workers` worker threads.
///
/// Threads are named `was7-worker-<n>`. The blocking pool shares the
/// naming, so its threads are told apart by their higher numbers.
pub fn build_runtime(workers: usize) -> Result<Runtime, StartupError> {
    let next_thread = AtomicUsize::new(0);

    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(workers)
        .thread_name_fn(move || {
            format!("was7-worker-{}", next_thread.fetch_add(1, Ordering::Relaxed))
        })
        .on_thread_start(|| {
            tracing::info!(thread = current_thread_name(), "Worker spawned");
        })
        .on_thread_stop(|| {
            tracing::info!(thread = current_thread_name(), "Worker exited");
        })
        .enable_all()
        .build()
        .map_err(StartupError::Runtime)
}

fn current_thread_name() -> String {
    std::thread::current()
        .name()
        .unwrap_or("unnamed")
        .to_string()
}

/// External dependency clients shared by all requests.
#[derive(Clone)]
pub struct Services {
    pub cache: CacheClient,
    pub messages: MessageClient,
}

/// Connect both clients. Failures leave the affected client disconnected.
pub async fn connect_services(config: &AppConfig) -> Services {
    let cache = CacheClient::connect(&config.cache).await;
    let messages = MessageClient::connect(&config.messaging, &config.service.name);

    tracing::info!(
        cache_connected = cache.is_connected(),
        broker_connected = messages.is_connected(),
        "Dependencies initialized"
    );

    Services { cache, messages }
}

/// Run the service until SIGINT/SIGTERM, then shut down gracefully.
pub async fn serve(config: Arc<AppConfig>) -> Result<(), StartupError> {
    // Initial workers start before logging is installed.
    tracing::info!(
        workers = Handle::current().metrics().num_workers(),
        "Worker pool started"
    );

    let recorder = metrics::install_recorder()?;
    let services = connect_services(&config).await;

    let address = config.listener.bind_address.clone();
    let listener = TcpListener::bind(&address)
        .await
        .map_err(|source| StartupError::Bind { address, source })?;

    let shutdown_signal = async {
        match signals::wait_for_shutdown().await {
            Ok(signal) => tracing::info!(%signal, "Shutdown requested"),
            Err(e) => tracing::error!(error = %e, "Signal handling failed, shutting down"),
        }
    };

    run_until(config, services, recorder, listener, shutdown_signal).await
}

/// Serve on `listener` until `shutdown_signal` resolves.
///
/// In-flight requests get `graceful_timeout_secs` to finish before the
/// server task is aborted. The message producer is flushed either way.
pub async fn run_until<F>(
    config: Arc<AppConfig>,
    services: Services,
    recorder: PrometheusHandle,
    listener: TcpListener,
    shutdown_signal: F,
) -> Result<(), StartupError>
where
    F: Future<Output = ()>,
{
    let shutdown = Shutdown::new();
    let messages = services.messages.clone();
    let server = HttpServer::new(
        Arc::clone(&config),
        services.cache,
        services.messages,
        recorder,
    );
    let mut server_task = tokio::spawn(server.run(listener, shutdown.subscribe()));

    tokio::select! {
        joined = &mut server_task => {
            flush_producer(messages).await;
            return server_outcome(joined);
        }
        _ = shutdown_signal => {}
    }

    shutdown.trigger();

    let grace = Duration::from_secs(config.listener.graceful_timeout_secs);
    let outcome = match tokio::time::timeout(grace, &mut server_task).await {
        Ok(joined) => server_outcome(joined),
        Err(_) => {
            tracing::warn!(
                timeout_secs = config.listener.graceful_timeout_secs,
                "Graceful shutdown timed out, aborting in-flight requests"
            );
            server_task.abort();
            Ok(())
        }
    };

    flush_producer(messages).await;
    tracing::info!("Shutdown complete");
    outcome
}

fn server_outcome(joined: Result<io::Result<()>, JoinError>) -> Result<(), StartupError> {
    match joined {
        Ok(result) => result.map_err(StartupError::Serve),
        Err(e) => Err(StartupError::Serve(io::Error::other(e))),
    }
}

/// Flush runs on the blocking pool; the producer call blocks until done.
async fn flush_producer(messages: MessageClient) {
    let flushed =
        tokio::task::spawn_blocking(move || messages.flush(PRODUCER_FLUSH_TIMEOUT)).await;
    if let Err(e) = flushed {
        tracing::warn!(error = %e, "Message producer flush task failed");
    }
}

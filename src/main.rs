//! WAS-7 demo web service.
//!
//! An HTTP façade over a Redis cluster and a Kafka cluster, instrumented
//! with structured logs, Prometheus metrics and OpenTelemetry traces.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client ──▶ http::server (axum + tower layers)
//!                    │  request id, trace span, timeout, body limit
//!                    ▼
//!                /api/* middleware (metrics + completion log)
//!                    │
//!          ┌─────────┼──────────────┐
//!          ▼         ▼              ▼
//!     cache client  message client  diagnostics
//!     (Redis)       (Kafka)         (slow / error)
//! ```

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;

use was7::config::{load_config, validation::validate_config, AppConfig, ConfigError};
use was7::lifecycle::{build_runtime, serve};
use was7::observability::init_telemetry;

#[derive(Debug, Parser)]
#[command(name = "was7", version, about = "WAS-7 demo web service")]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Listen address, overriding config and BIND_ADDRESS
    #[arg(short, long)]
    bind: Option<String>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match configure(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("was7: {e}");
            return ExitCode::FAILURE;
        }
    };

    let runtime = match build_runtime(config.worker_count()) {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("was7: {e}");
            return ExitCode::FAILURE;
        }
    };

    // The OTLP exporter needs a runtime context when it is built and when
    // the guard flushes it, so both happen with the runtime entered.
    let _entered = runtime.enter();
    let guard = match init_telemetry(&config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("was7: {e}");
            return ExitCode::FAILURE;
        }
    };

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        bind_address = %config.listener.bind_address,
        workers = config.worker_count(),
        tracing_enabled = guard.tracing_enabled(),
        "was7 starting"
    );

    let result = runtime.block_on(serve(Arc::new(config)));
    let code = match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Service failed");
            ExitCode::FAILURE
        }
    };

    drop(guard);
    code
}

fn configure(cli: &Cli) -> Result<AppConfig, ConfigError> {
    let mut config = load_config(cli.config.as_deref())?;
    if let Some(bind) = &cli.bind {
        config.listener.bind_address = bind.clone();
        validate_config(&config).map_err(ConfigError::Validation)?;
    }
    Ok(config)
}

//! Metrics collection and exposition.
//!
//! # Metrics
//! - `http_requests_total` (counter): requests by method, path, status
//! - `http_request_duration_seconds` (histogram): latency by method, path
//!
//! The Prometheus recorder is process-wide; [`install_recorder`] is
//! idempotent and hands out clones of the same render handle.

use std::sync::OnceLock;
use std::time::Duration;

use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use tokio::task::{AbortHandle, JoinHandle};

use crate::observability::TelemetryError;

pub const REQUESTS_TOTAL: &str = "http_requests_total";
pub const REQUEST_DURATION_SECONDS: &str = "http_request_duration_seconds";

/// Content type of the text exposition format.
pub const CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

const DURATION_BUCKETS: [f64; 7] = [0.01, 0.05, 0.1, 0.5, 1.0, 2.0, 5.0];

static RECORDER: OnceLock<Result<PrometheusHandle, String>> = OnceLock::new();

/// Install the global Prometheus recorder, or return the existing handle.
pub fn install_recorder() -> Result<PrometheusHandle, TelemetryError> {
    RECORDER
        .get_or_init(|| {
            let handle = PrometheusBuilder::new()
                .set_buckets_for_metric(
                    Matcher::Full(REQUEST_DURATION_SECONDS.to_string()),
                    &DURATION_BUCKETS,
                )
                .map_err(|e| e.to_string())?
                .install_recorder()
                .map_err(|e| e.to_string())?;

            metrics::describe_counter!(REQUESTS_TOTAL, "Total HTTP requests");
            metrics::describe_histogram!(
                REQUEST_DURATION_SECONDS,
                metrics::Unit::Seconds,
                "HTTP request duration in seconds"
            );

            Ok(handle)
        })
        .clone()
        .map_err(TelemetryError::Metrics)
}

/// Background recorder upkeep. Dropping the value stops the task.
pub struct UpkeepTask {
    handle: JoinHandle<()>,
}

impl UpkeepTask {
    pub fn abort_handle(&self) -> AbortHandle {
        self.handle.abort_handle()
    }
}

impl Drop for UpkeepTask {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Run recorder upkeep on an interval while the returned guard is alive.
pub fn spawn_upkeep(recorder: PrometheusHandle, every: Duration) -> UpkeepTask {
    let handle = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        loop {
            ticker.tick().await;
            recorder.run_upkeep();
        }
    });
    UpkeepTask { handle }
}

/// Record one completed request.
pub fn record_request(method: &str, path: &str, status: u16, elapsed: Duration) {
    metrics::counter!(
        REQUESTS_TOTAL,
        "method" => method.to_string(),
        "path" => path.to_string(),
        "status" => status.to_string()
    )
    .increment(1);

    metrics::histogram!(
        REQUEST_DURATION_SECONDS,
        "method" => method.to_string(),
        "path" => path.to_string()
    )
    .record(elapsed.as_secs_f64());
}

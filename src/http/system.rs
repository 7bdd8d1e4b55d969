//! Service-level endpoints: health, metrics exposition, instance info.

use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

use crate::health::{HealthStatus, Status};
use crate::http::response::utc_timestamp;
use crate::http::server::AppState;
use crate::observability::metrics::CONTENT_TYPE as METRICS_CONTENT_TYPE;

pub const FRAMEWORK: &str = "axum";

#[derive(Debug, Serialize)]
pub struct HealthReport {
    pub status: Status,
    pub service: String,
    pub timestamp: String,
    pub checks: DependencyChecks,
}

#[derive(Debug, Serialize)]
pub struct DependencyChecks {
    pub redis: HealthStatus,
    pub kafka: HealthStatus,
}

/// `GET /health`. Always 200 with status UP; dependency state is only
/// reported under `checks`.
pub async fn health(State(state): State<AppState>) -> Json<HealthReport> {
    let (redis, kafka) = tokio::join!(state.cache.health_check(), state.messages.health_check());

    Json(HealthReport {
        status: Status::Up,
        service: state.config.service.name.clone(),
        timestamp: utc_timestamp(),
        checks: DependencyChecks { redis, kafka },
    })
}

/// `GET /metrics` in the Prometheus text format.
pub async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, METRICS_CONTENT_TYPE)],
        state.metrics.render(),
    )
}

#[derive(Debug, Serialize)]
pub struct ServiceInfo {
    pub service: String,
    #[serde(rename = "type")]
    pub runtime_type: String,
    pub framework: &'static str,
    pub version: &'static str,
    pub timestamp: String,
    pub hostname: String,
    pub ip: String,
    pub environment: PodEnvironment,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct PodEnvironment {
    pub pod_name: String,
    pub pod_namespace: String,
    pub node_name: String,
}

impl PodEnvironment {
    fn from_env() -> Self {
        let var = |name: &str, default: &str| {
            std::env::var(name).unwrap_or_else(|_| default.to_string())
        };
        Self {
            pod_name: var("POD_NAME", "local"),
            pod_namespace: var("POD_NAMESPACE", "default"),
            node_name: var("NODE_NAME", "local"),
        }
    }
}

/// `GET /api/info`.
pub async fn info(State(state): State<AppState>) -> Json<ServiceInfo> {
    Json(ServiceInfo {
        service: state.config.service.name.clone(),
        runtime_type: state.config.service.runtime_type.clone(),
        framework: FRAMEWORK,
        version: env!("CARGO_PKG_VERSION"),
        timestamp: utc_timestamp(),
        hostname: local_hostname(),
        ip: local_ip().await,
        environment: PodEnvironment::from_env(),
    })
}

fn local_hostname() -> String {
    hostname::get()
        .ok()
        .and_then(|name| name.into_string().ok())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Address of the interface used for outbound traffic. Connecting a UDP
/// socket sends nothing; it only selects a route.
async fn local_ip() -> String {
    async fn probe() -> std::io::Result<std::net::IpAddr> {
        let socket = tokio::net::UdpSocket::bind("0.0.0.0:0").await?;
        socket.connect("8.8.8.8:80").await?;
        Ok(socket.local_addr()?.ip())
    }

    match probe().await {
        Ok(ip) if !ip.is_unspecified() => ip.to_string(),
        _ => "127.0.0.1".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn local_ip_is_an_address() {
        let ip = local_ip().await;
        assert!(ip.parse::<std::net::IpAddr>().is_ok());
    }

    #[test]
    fn pod_environment_keys() {
        let value = serde_json::to_value(PodEnvironment::from_env()).unwrap();
        for key in ["POD_NAME", "POD_NAMESPACE", "NODE_NAME"] {
            assert!(value.get(key).is_some(), "missing {key}");
        }
    }
}

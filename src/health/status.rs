//! Health status of a single external dependency.

use serde::Serialize;

/// Liveness of a dependency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Status {
    Up,
    Down,
}

/// Extra information attached to a status, flattened into the JSON object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthDetail {
    /// Raw reply to a liveness probe.
    Response(String),
    /// Number of topics visible in broker metadata.
    TopicsCount(usize),
    /// Why the dependency is down.
    Error(String),
}

/// Result of one health probe: `{"status": "UP", "response": "PONG"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthStatus {
    pub status: Status,
    #[serde(flatten)]
    pub detail: HealthDetail,
}

impl HealthStatus {
    pub fn up(detail: HealthDetail) -> Self {
        Self {
            status: Status::Up,
            detail,
        }
    }

    pub fn down(error: impl Into<String>) -> Self {
        Self {
            status: Status::Down,
            detail: HealthDetail::Error(error.into()),
        }
    }

    pub fn is_up(&self) -> bool {
        self.status == Status::Up
    }
}

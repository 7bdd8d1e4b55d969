//! Dependency health reporting.
//!
//! # Data Flow
//! ```text
//! GET /health
//!     → CacheClient::health_check   (PING)
//!     → MessageClient::health_check (cluster metadata)
//!     → status.rs (HealthStatus per dependency)
//!     → JSON response
//! ```
//!
//! # Design Decisions
//! - Checks run synchronously per request; results are never cached
//! - A failing dependency is reported DOWN, it never fails the request

pub mod status;

pub use status::{HealthDetail, HealthStatus, Status};

//! Distributed cache access.
//!
//! # Data Flow
//! ```text
//! HTTP handler
//!     → client.rs (CacheClient: degrade reads, propagate writes)
//!     → backend.rs (CacheBackend trait)
//!     → redis.rs (Redis cluster connection)
//! ```
//!
//! # Design Decisions
//! - The service keeps no local copy of any entry
//! - Reads and deletes never fail the caller; `Lookup` keeps the reason
//!   visible in logs while the HTTP layer collapses it to "not found"
//! - Writes propagate errors; there is no local retry

pub mod backend;
pub mod client;
pub mod redis;

pub use backend::{CacheBackend, CacheError};
pub use client::{CacheClient, Lookup};
pub use self::redis::RedisClusterBackend;

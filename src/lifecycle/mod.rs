//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Build runtime → Install metrics → Connect dependencies → Bind → Serve
//!
//! Shutdown (shutdown.rs):
//!     Signal received → Stop accepting → Drain (bounded) → Flush producer
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//!     SIGHUP → Logged reload request
//! ```
//!
//! # Design Decisions
//! - Dependency connection failures are not fatal; the service starts
//!   degraded and reports DOWN checks on /health
//! - Shutdown has timeout: in-flight requests are aborted after the deadline

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
pub use startup::{build_runtime, connect_services, run_until, serve, Services, StartupError};

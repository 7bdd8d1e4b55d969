//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum router, tower layers)
//!     → request.rs (assign or propagate X-Request-Id)
//!     → middleware/ (per-request metrics + completion log on /api/*)
//!     → system.rs | cache.rs | message.rs | diagnostics.rs (handlers)
//!     → response.rs (error mapping)
//!     → Send to client
//! ```

pub mod cache;
pub mod diagnostics;
pub mod message;
pub mod middleware;
pub mod request;
pub mod response;
pub mod server;
pub mod system;

pub use request::{RequestContext, X_REQUEST_ID, X_SERVICE};
pub use response::ApiError;
pub use server::{AppState, HttpServer};

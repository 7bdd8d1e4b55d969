//! Request identification.
//!
//! # Responsibilities
//! - Assign a UUID v4 `X-Request-Id` when the client sent none
//! - Echo the request id on every response
//! - Carry the per-request context (id, start time) to handlers
//!
//! # Design Decisions
//! - Request ID added as early as possible (outermost layers) so error
//!   responses produced by inner layers carry it as well

use std::time::{Duration, Instant};

use axum::http::Request;
use tower_http::request_id::{
    MakeRequestUuid, PropagateRequestIdLayer, RequestId, SetRequestIdLayer,
};
use uuid::Uuid;

pub const X_REQUEST_ID: &str = "x-request-id";
pub const X_SERVICE: &str = "x-service";

/// Layer that generates `x-request-id` for requests lacking one.
pub fn set_request_id_layer() -> SetRequestIdLayer<MakeRequestUuid> {
    SetRequestIdLayer::x_request_id(MakeRequestUuid)
}

/// Layer that copies the request's `x-request-id` onto the response.
pub fn propagate_request_id_layer() -> PropagateRequestIdLayer {
    PropagateRequestIdLayer::x_request_id()
}

/// Correlation id of `request`.
///
/// Reads the id recorded by [`set_request_id_layer`], falling back to the
/// raw header, so the value always matches what the response echoes.
pub fn request_id<B>(request: &Request<B>) -> Option<String> {
    request
        .extensions()
        .get::<RequestId>()
        .map(RequestId::header_value)
        .or_else(|| request.headers().get(X_REQUEST_ID))
        .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned())
}

/// Per-request context, created on entry and dropped with the response.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub request_id: String,
    pub started_at: Instant,
}

impl RequestContext {
    /// Capture the correlation id of `request`, generating one if absent.
    pub fn from_request<B>(request: &Request<B>) -> Self {
        Self {
            request_id: request_id(request).unwrap_or_else(|| Uuid::new_v4().to_string()),
            started_at: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }
}

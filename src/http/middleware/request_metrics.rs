//! Per-request metrics and completion logging.
//!
//! Installed outside the timeout and body-limit layers so requests they
//! reject are counted as well.

use axum::{extract::Request, middleware::Next, response::Response};

use crate::http::request::RequestContext;
use crate::observability::metrics;

const TRACKED_PREFIX: &str = "/api/";

/// Creates the [`RequestContext`] for every request. For `/api/*` paths it
/// also records the request count and duration and emits one completion
/// log line.
pub async fn track_request(mut request: Request, next: Next) -> Response {
    let context = RequestContext::from_request(&request);
    request.extensions_mut().insert(context.clone());

    let path = request.uri().path().to_string();
    if !path.starts_with(TRACKED_PREFIX) {
        return next.run(request).await;
    }
    let method = request.method().to_string();

    let response = next.run(request).await;

    let status = response.status().as_u16();
    let elapsed = context.elapsed();
    metrics::record_request(&method, &path, status, elapsed);

    tracing::info!(
        request_id = %context.request_id,
        method = %method,
        path = %path,
        status,
        duration = %format!("{:.3}s", elapsed.as_secs_f64()),
        "Request completed"
    );

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::request::{propagate_request_id_layer, set_request_id_layer};
    use axum::body::Body;
    use axum::routing::get;
    use axum::{middleware, Extension, Router};
    use tower::{ServiceBuilder, ServiceExt};

    async fn echo_context(Extension(context): Extension<RequestContext>) -> String {
        context.request_id
    }

    fn router() -> Router {
        Router::new().route("/api/whoami", get(echo_context)).layer(
            ServiceBuilder::new()
                .layer(set_request_id_layer())
                .layer(propagate_request_id_layer())
                .layer(middleware::from_fn(track_request)),
        )
    }

    async fn logged_and_echoed(request: axum::http::Request<Body>) -> (String, String) {
        let response = router().oneshot(request).await.unwrap();
        let echoed = response.headers()["x-request-id"]
            .to_str()
            .unwrap()
            .to_string();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (String::from_utf8(body.to_vec()).unwrap(), echoed)
    }

    #[tokio::test]
    async fn blank_request_id_matches_echo() {
        let request = axum::http::Request::get("/api/whoami")
            .header("x-request-id", "")
            .body(Body::empty())
            .unwrap();
        let (logged, echoed) = logged_and_echoed(request).await;
        assert_eq!(logged, echoed);
        assert_eq!(logged, "");
    }

    #[tokio::test]
    async fn generated_request_id_matches_echo() {
        let request = axum::http::Request::get("/api/whoami")
            .body(Body::empty())
            .unwrap();
        let (logged, echoed) = logged_and_echoed(request).await;
        assert_eq!(logged, echoed);
        assert!(uuid::Uuid::parse_str(&logged).is_ok());
    }
}

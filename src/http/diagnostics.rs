//! Synthetic latency and error endpoints for exercising dashboards and
//! alerting.

use std::time::Duration;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};

use crate::http::request::RequestContext;
use crate::http::response::ApiError;
use crate::http::server::AppState;

const DEFAULT_DELAY_MS: u64 = 1000;
const DEFAULT_ERROR_CODE: u16 = 500;

const SLOW_MESSAGE: &str = "This endpoint simulates slow responses";
const ERROR_MESSAGE: &str = "This endpoint simulates errors";

#[derive(Debug, Deserialize)]
pub struct SlowParams {
    pub delay: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct SlowResponse {
    pub service: String,
    pub endpoint: &'static str,
    pub delay_ms: u64,
    pub message: &'static str,
}

/// `GET /api/slow?delay=N`. Sleeps without holding a worker thread.
pub async fn slow(State(state): State<AppState>, Query(params): Query<SlowParams>) -> Json<SlowResponse> {
    let delay_ms = params.delay.unwrap_or(DEFAULT_DELAY_MS);
    tokio::time::sleep(Duration::from_millis(delay_ms)).await;

    Json(SlowResponse {
        service: state.config.service.name.clone(),
        endpoint: "/api/slow",
        delay_ms,
        message: SLOW_MESSAGE,
    })
}

#[derive(Debug, Deserialize)]
pub struct ErrorParams {
    pub code: Option<u16>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub service: String,
    pub endpoint: &'static str,
    pub error_code: u16,
    pub message: &'static str,
}

/// `GET /api/error?code=N`. Answers with status N (200-599).
pub async fn error(
    State(state): State<AppState>,
    Extension(context): Extension<RequestContext>,
    Query(params): Query<ErrorParams>,
) -> Result<(StatusCode, Json<ErrorResponse>), ApiError> {
    let code = params.code.unwrap_or(DEFAULT_ERROR_CODE);
    let status = simulated_status(code)?;

    tracing::error!(
        request_id = %context.request_id,
        error_code = code,
        "Error endpoint called with code: {code}"
    );

    Ok((
        status,
        Json(ErrorResponse {
            service: state.config.service.name.clone(),
            endpoint: "/api/error",
            error_code: code,
            message: ERROR_MESSAGE,
        }),
    ))
}

fn simulated_status(code: u16) -> Result<StatusCode, ApiError> {
    match code {
        200..=599 => StatusCode::from_u16(code).map_err(|_| ApiError::InvalidStatusCode(code)),
        _ => Err(ApiError::InvalidStatusCode(code)),
    }
}

//! `/api/cache/{key}` handlers.

use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::http::response::ApiError;
use crate::http::server::AppState;

const CLUSTER: &str = "redis-cluster";

#[derive(Debug, Serialize)]
pub struct GetResponse {
    pub operation: &'static str,
    pub key: String,
    pub value: Option<String>,
    pub found: bool,
    pub source: &'static str,
}

#[derive(Debug, Deserialize)]
pub struct PutRequest {
    #[serde(default = "empty_value")]
    pub value: Value,
    pub ttl: Option<u64>,
}

fn empty_value() -> Value {
    Value::String(String::new())
}

#[derive(Debug, Serialize)]
pub struct PutResponse {
    pub operation: &'static str,
    pub key: String,
    pub value: Value,
    pub ttl: u64,
    pub success: bool,
    pub destination: &'static str,
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub operation: &'static str,
    pub key: String,
    pub deleted: bool,
    pub destination: &'static str,
}

/// `GET /api/cache/{key}`. A missing key and an unavailable cache both
/// answer 200 with `found: false`.
pub async fn get_entry(State(state): State<AppState>, Path(key): Path<String>) -> Json<GetResponse> {
    let value = state.cache.get(&key).await.found();

    Json(GetResponse {
        operation: "GET",
        found: value.is_some(),
        key,
        value,
        source: CLUSTER,
    })
}

/// `PUT /api/cache/{key}`. Write failures answer 500.
pub async fn put_entry(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Json(body): Json<PutRequest>,
) -> Result<Json<PutResponse>, ApiError> {
    let ttl = body.ttl.unwrap_or(state.config.cache.default_ttl_secs);
    state.cache.set(&key, &body.value, ttl).await?;

    Ok(Json(PutResponse {
        operation: "SET",
        key,
        value: body.value,
        ttl,
        success: true,
        destination: CLUSTER,
    }))
}

/// `DELETE /api/cache/{key}`.
pub async fn delete_entry(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Json<DeleteResponse> {
    let deleted = state.cache.delete(&key).await.is_found();

    Json(DeleteResponse {
        operation: "DELETE",
        key,
        deleted,
        destination: CLUSTER,
    })
}

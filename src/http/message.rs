//! `POST /api/message` handler.

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::http::response::ApiError;
use crate::http::server::AppState;

#[derive(Debug, Deserialize)]
pub struct PublishRequest {
    pub topic: Option<String>,
    #[serde(default = "empty_message")]
    pub message: Value,
    pub key: Option<String>,
}

fn empty_message() -> Value {
    Value::String(String::new())
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishResponse {
    pub operation: &'static str,
    pub topic: String,
    pub key: String,
    pub message_id: String,
    pub success: bool,
    pub broker: &'static str,
}

/// Queue a message for publication. Missing or empty `topic` falls back
/// to the configured default topic.
pub async fn publish(
    State(state): State<AppState>,
    Json(body): Json<PublishRequest>,
) -> Result<Json<PublishResponse>, ApiError> {
    let topic = body
        .topic
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| state.config.messaging.default_topic.clone());
    let key = body.key.filter(|k| !k.is_empty());

    let message_id = state
        .messages
        .send(&topic, key.as_deref(), &body.message)
        .await?;

    Ok(Json(PublishResponse {
        operation: "PUBLISH",
        topic,
        key: key.unwrap_or_else(|| "null".to_string()),
        message_id,
        success: true,
        broker: "kafka-cluster",
    }))
}

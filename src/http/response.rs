//! Error responses.
//!
//! Read-path cache failures never reach this module; they are folded into
//! negative results by the cache client. What remains are write-path
//! dependency failures and invalid caller input.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{SecondsFormat, Utc};
use serde_json::json;
use thiserror::Error;

use crate::cache::CacheError;
use crate::messaging::MessagingError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Cache(#[from] CacheError),
    #[error(transparent)]
    Messaging(#[from] MessagingError),
    #[error("status code {0} is outside 200-599")]
    InvalidStatusCode(u16),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Cache(_) | ApiError::Messaging(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::InvalidStatusCode(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        } else {
            tracing::warn!(error = %self, "Request rejected");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

/// Current UTC time as ISO-8601 with a `Z` suffix.
pub fn utc_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_statuses() {
        assert_eq!(
            ApiError::from(CacheError::NotConnected).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::from(MessagingError::NotConnected).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(ApiError::InvalidStatusCode(42).status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn timestamp_is_utc() {
        let ts = utc_timestamp();
        assert!(ts.ends_with('Z'));
        assert!(chrono::DateTime::parse_from_rfc3339(&ts).is_ok());
    }
}

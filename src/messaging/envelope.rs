//! Message envelope.

use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use crate::messaging::broker::MessagingError;

/// Wrapper placed around every outbound payload.
#[derive(Debug, Clone, Serialize)]
pub struct Envelope {
    pub id: Uuid,
    pub source: String,
    /// ISO-8601 UTC with a `Z` suffix.
    pub timestamp: String,
    pub payload: Value,
}

impl Envelope {
    /// Wrap `message` for publishing.
    ///
    /// A string payload that begins with `{` is parsed as a JSON object
    /// and embedded structurally; if it does not parse, the send fails.
    /// Every other payload is embedded unchanged.
    pub fn wrap(id: Uuid, source: &str, message: &Value) -> Result<Self, MessagingError> {
        let payload = match message {
            Value::String(text) if text.starts_with('{') => serde_json::from_str(text)?,
            other => other.clone(),
        };

        Ok(Self {
            id,
            source: source.to_string(),
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true),
            payload,
        })
    }

    pub fn to_json(&self) -> Result<String, MessagingError> {
        Ok(serde_json::to_string(self)?)
    }
}

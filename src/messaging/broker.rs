//! Broker abstraction.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

/// Errors raised by messaging operations.
#[derive(Debug, Error)]
pub enum MessagingError {
    #[error("Kafka not connected")]
    NotConnected,
    #[error("kafka error: {0}")]
    Kafka(#[from] rdkafka::error::KafkaError),
    #[error("invalid JSON payload: {0}")]
    Payload(#[from] serde_json::Error),
    #[error("metadata probe aborted: {0}")]
    Join(#[from] tokio::task::JoinError),
    #[error("broker error: {0}")]
    Broker(String),
}

/// A fully built record ready for the producer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    pub topic: String,
    pub key: String,
    pub payload: String,
    pub headers: Vec<(String, String)>,
}

impl OutboundMessage {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Producer plus metadata access on a message broker.
#[async_trait]
pub trait MessageBroker: Send + Sync {
    /// Queue a record for delivery. Returns once queued; the delivery
    /// outcome is only logged.
    fn enqueue(&self, message: OutboundMessage) -> Result<(), MessagingError>;

    /// Number of topics in the cluster metadata.
    async fn topic_count(&self) -> Result<usize, MessagingError>;

    /// Wait for queued records to be delivered, up to `timeout`.
    fn flush(&self, _timeout: Duration) -> Result<(), MessagingError> {
        Ok(())
    }
}

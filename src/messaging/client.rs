//! Message client used by the HTTP handlers.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use uuid::Uuid;

use crate::config::MessagingConfig;
use crate::health::{HealthDetail, HealthStatus};
use crate::messaging::broker::{MessageBroker, MessagingError, OutboundMessage};
use crate::messaging::envelope::Envelope;
use crate::messaging::kafka::KafkaBroker;

/// Handle on the message broker, shared by all requests.
#[derive(Clone)]
pub struct MessageClient {
    broker: Option<Arc<dyn MessageBroker>>,
    source: String,
}

impl MessageClient {
    /// Construct the Kafka producer. A construction failure is logged and
    /// produces a disconnected client.
    pub fn connect(config: &MessagingConfig, source: &str) -> Self {
        match KafkaBroker::connect(config, source) {
            Ok(broker) => {
                tracing::info!(brokers = %config.bootstrap_servers(), "Kafka producer connected");
                Self::with_broker(Arc::new(broker), source)
            }
            Err(e) => {
                tracing::error!(brokers = %config.bootstrap_servers(), error = %e, "Failed to connect to Kafka");
                Self::disconnected(source)
            }
        }
    }

    pub fn with_broker(broker: Arc<dyn MessageBroker>, source: &str) -> Self {
        Self {
            broker: Some(broker),
            source: source.to_string(),
        }
    }

    pub fn disconnected(source: &str) -> Self {
        Self {
            broker: None,
            source: source.to_string(),
        }
    }

    pub fn is_connected(&self) -> bool {
        self.broker.is_some()
    }

    /// Publish `message` to `topic` and return its id.
    ///
    /// The record is keyed by `key`, or by the message id when no non-empty
    /// key is given. Returns as soon as the record is queued.
    pub async fn send(
        &self,
        topic: &str,
        key: Option<&str>,
        message: &Value,
    ) -> Result<String, MessagingError> {
        let broker = self.broker.as_ref().ok_or(MessagingError::NotConnected)?;

        let id = Uuid::new_v4();
        let message_id = id.to_string();
        let envelope = Envelope::wrap(id, &self.source, message)?;

        let outbound = OutboundMessage {
            topic: topic.to_string(),
            key: key
                .filter(|k| !k.is_empty())
                .unwrap_or(message_id.as_str())
                .to_string(),
            payload: envelope.to_json()?,
            headers: vec![
                ("content-type".to_string(), "application/json".to_string()),
                ("message-id".to_string(), message_id.clone()),
                ("source".to_string(), self.source.clone()),
            ],
        };

        if let Err(e) = broker.enqueue(outbound) {
            tracing::error!(topic, error = %e, "Failed to send message");
            return Err(e);
        }

        tracing::debug!(topic, message_id = %message_id, "Message queued");
        Ok(message_id)
    }

    pub async fn health_check(&self) -> HealthStatus {
        let Some(broker) = &self.broker else {
            return HealthStatus::down("Not connected");
        };

        match broker.topic_count().await {
            Ok(count) => HealthStatus::up(HealthDetail::TopicsCount(count)),
            Err(e) => HealthStatus::down(e.to_string()),
        }
    }

    /// Deliver queued records before shutdown. Failures are logged.
    pub fn flush(&self, timeout: Duration) {
        if let Some(broker) = &self.broker {
            match broker.flush(timeout) {
                Ok(()) => tracing::info!("Message producer flushed"),
                Err(e) => tracing::warn!(error = %e, "Message producer flush incomplete"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    #[derive(Default)]
    struct CapturingBroker {
        sent: Mutex<Vec<OutboundMessage>>,
    }

    #[async_trait]
    impl MessageBroker for CapturingBroker {
        fn enqueue(&self, message: OutboundMessage) -> Result<(), MessagingError> {
            self.sent.lock().unwrap().push(message);
            Ok(())
        }

        async fn topic_count(&self) -> Result<usize, MessagingError> {
            Ok(3)
        }
    }

    #[tokio::test]
    async fn send_builds_keyed_envelope() {
        let broker = Arc::new(CapturingBroker::default());
        let client = MessageClient::with_broker(broker.clone(), "was-7");

        let id = client.send("events", Some("user-1"), &json!("hello")).await.unwrap();
        assert!(Uuid::parse_str(&id).is_ok());

        let sent = broker.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        let record = &sent[0];
        assert_eq!(record.topic, "events");
        assert_eq!(record.key, "user-1");
        assert_eq!(record.header("message-id"), Some(id.as_str()));
        assert_eq!(record.header("source"), Some("was-7"));
        assert_eq!(record.header("content-type"), Some("application/json"));

        let envelope: Value = serde_json::from_str(&record.payload).unwrap();
        assert_eq!(envelope["id"], json!(id));
        assert_eq!(envelope["source"], json!("was-7"));
        assert_eq!(envelope["payload"], json!("hello"));
    }

    #[tokio::test]
    async fn missing_or_empty_key_falls_back_to_message_id() {
        let broker = Arc::new(CapturingBroker::default());
        let client = MessageClient::with_broker(broker.clone(), "was-7");

        let first = client.send("t", None, &json!("m")).await.unwrap();
        let second = client.send("t", Some(""), &json!("m")).await.unwrap();
        assert_ne!(first, second);

        let sent = broker.sent.lock().unwrap();
        assert_eq!(sent[0].key, first);
        assert_eq!(sent[1].key, second);
    }

    #[tokio::test]
    async fn disconnected_client_refuses_to_send() {
        let client = MessageClient::disconnected("was-7");
        let err = client.send("t", None, &json!("m")).await.unwrap_err();
        assert!(matches!(err, MessagingError::NotConnected));
        assert_eq!(client.health_check().await, HealthStatus::down("Not connected"));
    }

    #[tokio::test]
    async fn health_reports_topic_count() {
        let client = MessageClient::with_broker(Arc::new(CapturingBroker::default()), "was-7");
        assert_eq!(
            client.health_check().await,
            HealthStatus::up(HealthDetail::TopicsCount(3))
        );
    }
}

//! Kafka producer and metadata client.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rdkafka::admin::AdminClient;
use rdkafka::client::DefaultClientContext;
use rdkafka::config::ClientConfig;
use rdkafka::message::{Header, OwnedHeaders};
use rdkafka::producer::{FutureProducer, FutureRecord, Producer};

use crate::config::MessagingConfig;
use crate::messaging::broker::{MessageBroker, MessagingError, OutboundMessage};

/// Broker handle holding a producer and an admin client for metadata.
pub struct KafkaBroker {
    producer: FutureProducer,
    admin: Arc<AdminClient<DefaultClientContext>>,
    metadata_timeout: Duration,
}

impl KafkaBroker {
    /// Build the producer and admin clients. Construction does not contact
    /// the brokers; unreachable brokers surface on first use.
    pub fn connect(config: &MessagingConfig, client_id: &str) -> Result<Self, MessagingError> {
        let servers = config.bootstrap_servers();

        let producer: FutureProducer = ClientConfig::new()
            .set("bootstrap.servers", &servers)
            .set("client.id", client_id)
            .set("acks", &config.acks)
            .set("retries", config.retries.to_string())
            .set("retry.backoff.ms", config.retry_backoff_ms.to_string())
            .create()?;

        let admin: AdminClient<DefaultClientContext> = ClientConfig::new()
            .set("bootstrap.servers", &servers)
            .create()?;

        Ok(Self {
            producer,
            admin: Arc::new(admin),
            metadata_timeout: Duration::from_secs(config.metadata_timeout_secs),
        })
    }
}

#[async_trait]
impl MessageBroker for KafkaBroker {
    #[tracing::instrument(
        name = "kafka.produce",
        skip(self, message),
        fields(messaging.system = "kafka", topic = %message.topic)
    )]
    fn enqueue(&self, message: OutboundMessage) -> Result<(), MessagingError> {
        let headers = message
            .headers
            .iter()
            .fold(OwnedHeaders::new(), |headers, (key, value)| {
                headers.insert(Header {
                    key: key.as_str(),
                    value: Some(value.as_str()),
                })
            });

        let record = FutureRecord::to(&message.topic)
            .key(message.key.as_str())
            .payload(message.payload.as_str())
            .headers(headers);

        let delivery = self
            .producer
            .send_result(record)
            .map_err(|(e, _)| MessagingError::Kafka(e))?;

        let message_id = message.header("message-id").unwrap_or_default().to_string();
        let topic = message.topic.clone();
        tokio::spawn(async move {
            match delivery.await {
                Ok(Ok((partition, offset))) => {
                    tracing::info!(
                        message_id = %message_id,
                        topic = %topic,
                        partition,
                        offset,
                        "Message delivered"
                    );
                }
                Ok(Err((e, _))) => {
                    tracing::error!(message_id = %message_id, topic = %topic, error = %e, "Message delivery failed");
                }
                Err(_) => {
                    tracing::error!(message_id = %message_id, topic = %topic, "Message delivery canceled");
                }
            }
        });

        Ok(())
    }

    #[tracing::instrument(name = "kafka.metadata", skip(self), fields(messaging.system = "kafka"))]
    async fn topic_count(&self) -> Result<usize, MessagingError> {
        let admin = Arc::clone(&self.admin);
        let timeout = self.metadata_timeout;

        let count = tokio::task::spawn_blocking(move || {
            admin
                .inner()
                .fetch_metadata(None, timeout)
                .map(|metadata| metadata.topics().len())
        })
        .await??;

        Ok(count)
    }

    fn flush(&self, timeout: Duration) -> Result<(), MessagingError> {
        self.producer.flush(timeout)?;
        Ok(())
    }
}

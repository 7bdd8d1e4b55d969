//! Outbound messaging to the Kafka cluster.
//!
//! # Data Flow
//! ```text
//! POST /api/message
//!     → client.rs (MessageClient: id, key, envelope)
//!     → envelope.rs (wrap payload with id/source/timestamp)
//!     → broker.rs (MessageBroker trait)
//!     → kafka.rs (producer queue; delivery logged asynchronously)
//! ```
//!
//! # Design Decisions
//! - Send is fire-and-forget: the message id is returned once the record
//!   is queued, before the broker acknowledges it
//! - Delivery guarantees (acks, retries) are producer configuration only

pub mod broker;
pub mod client;
pub mod envelope;
pub mod kafka;

pub use broker::{MessageBroker, MessagingError, OutboundMessage};
pub use client::MessageClient;
pub use envelope::Envelope;
pub use kafka::KafkaBroker;

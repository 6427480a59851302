//! Message queue publishers.
//!
//! - [`RabbitMqHttpQueue`] publishes through the RabbitMQ management HTTP API.
//! - [`LoggingQueue`] logs each message and drops it; the server uses it
//!   when no broker is configured.

mod rabbitmq;

use async_trait::async_trait;
use serde_json::Value;
use tracing::info;

use crate::domain::ports::{MessageQueue, MessageQueueError};

pub use rabbitmq::{QueueSetupError, RabbitMqHttpQueue, RabbitMqSettings};

/// Publisher that records messages in the log instead of delivering them.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingQueue;

#[async_trait]
impl MessageQueue for LoggingQueue {
    async fn publish(&self, queue: &str, payload: &Value) -> Result<(), MessageQueueError> {
        info!(queue, %payload, "no broker configured; message logged and dropped");
        Ok(())
    }
}

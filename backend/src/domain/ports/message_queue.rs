//! Port for publishing messages to the broker.
use async_trait::async_trait;
use serde_json::Value;

use super::define_port_error;

define_port_error! {
    /// Errors raised by queue publishers.
    pub enum MessageQueueError {
        /// The broker could not be reached.
        Unavailable { message: String } => "message broker unavailable: {message}",
        /// The broker refused or failed to route the message.
        Rejected { message: String } => "message rejected: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessageQueue: Send + Sync {
    /// Publish `payload` as JSON onto `queue`.
    async fn publish(&self, queue: &str, payload: &Value) -> Result<(), MessageQueueError>;
}

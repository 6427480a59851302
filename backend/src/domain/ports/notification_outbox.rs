//! Port over the transactional notification outbox.
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{DeliveryFailure, OutboxEvent, OutboxEventId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by outbox adapters.
    pub enum OutboxError {
        /// Store connection could not be established.
        Connection { message: String } => "outbox connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "outbox query failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationOutbox: Send + Sync {
    /// Undelivered, unparked events due at or before `now`, oldest first.
    async fn due(&self, now: DateTime<Utc>, limit: usize)
    -> Result<Vec<OutboxEvent>, OutboxError>;

    /// Mark an event as delivered.
    async fn mark_dispatched(
        &self,
        id: &OutboxEventId,
        at: DateTime<Utc>,
    ) -> Result<(), OutboxError>;

    /// Record a failed delivery and when (if ever) to retry.
    async fn record_failure(
        &self,
        id: &OutboxEventId,
        failure: &DeliveryFailure,
        at: DateTime<Utc>,
    ) -> Result<(), OutboxError>;
}

//! Background delivery of outbox events to the message broker.
//!
//! Answers enqueue a "question answered" event in the same transaction that
//! stores them. The dispatcher drains due events in creation order, publishes
//! each through [`MessageQueue`], and marks it dispatched. Failed deliveries
//! are rescheduled with jittered exponential backoff; after `max_attempts`
//! the event is parked and left for an operator. A crash between publish and
//! mark re-delivers the event, so consumers see at-least-once delivery.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use mockable::Clock;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::domain::ports::{MessageQueue, NotificationOutbox, OutboxError};
use crate::domain::{DeliveryFailure, Error, OutboxEvent};

mod runtime;

pub use runtime::{AttemptJitter, DispatcherRuntime, TokioSleeper};

/// Polling and retry settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatcherConfig {
    /// Events fetched per poll.
    pub batch_size: usize,
    /// Pause between polls when the outbox is drained.
    pub poll_interval: Duration,
    /// Delivery attempts before an event is parked.
    pub max_attempts: u32,
    /// Backoff after the first failure.
    pub initial_backoff: Duration,
    /// Backoff cap.
    pub max_backoff: Duration,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            batch_size: 50,
            poll_interval: Duration::from_secs(2),
            max_attempts: 10,
            initial_backoff: Duration::from_millis(500),
            max_backoff: Duration::from_secs(60),
        }
    }
}

/// Counts from one pass over the outbox.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchReport {
    pub published: usize,
    pub rescheduled: usize,
    pub parked: usize,
}

impl DispatchReport {
    fn handled(&self) -> usize {
        self.published + self.rescheduled + self.parked
    }
}

/// Async sleep used between polls.
#[async_trait]
pub trait DispatchSleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Spreads retries of events that failed together.
pub trait BackoffJitter: Send + Sync {
    /// Return the delay to use instead of `base`.
    ///
    /// ```rust
    /// use qanda::domain::notification_dispatcher::BackoffJitter;
    /// use chrono::{TimeZone, Utc};
    /// use std::time::Duration;
    ///
    /// struct Fixed;
    /// impl BackoffJitter for Fixed {
    ///     fn jittered_delay(&self, base: Duration, _: u32, _: chrono::DateTime<Utc>) -> Duration {
    ///         base
    ///     }
    /// }
    /// let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).single().expect("valid time");
    /// assert_eq!(Fixed.jittered_delay(Duration::from_secs(1), 1, now), Duration::from_secs(1));
    /// ```
    fn jittered_delay(&self, base: Duration, attempt: u32, now: DateTime<Utc>) -> Duration;
}

/// Drains the notification outbox into the message broker.
pub struct NotificationDispatcher {
    outbox: Arc<dyn NotificationOutbox>,
    queue: Arc<dyn MessageQueue>,
    clock: Arc<dyn Clock>,
    sleeper: Arc<dyn DispatchSleeper>,
    jitter: Arc<dyn BackoffJitter>,
    config: DispatcherConfig,
}

impl NotificationDispatcher {
    /// Build a dispatcher with Tokio sleeping and the default jitter.
    pub fn new(
        outbox: Arc<dyn NotificationOutbox>,
        queue: Arc<dyn MessageQueue>,
        clock: Arc<dyn Clock>,
        config: DispatcherConfig,
    ) -> Self {
        Self::with_runtime(outbox, queue, clock, DispatcherRuntime::default(), config)
    }

    pub fn with_runtime(
        outbox: Arc<dyn NotificationOutbox>,
        queue: Arc<dyn MessageQueue>,
        clock: Arc<dyn Clock>,
        runtime: DispatcherRuntime,
        config: DispatcherConfig,
    ) -> Self {
        Self {
            outbox,
            queue,
            clock,
            sleeper: runtime.sleeper,
            jitter: runtime.jitter,
            config,
        }
    }

    /// Deliver every event currently due, up to one batch.
    pub async fn dispatch_pending(&self) -> Result<DispatchReport, Error> {
        let now = self.clock.utc();
        let due = self
            .outbox
            .due(now, self.config.batch_size.max(1))
            .await
            .map_err(map_outbox_error)?;

        let mut report = DispatchReport::default();
        for event in due {
            match self.queue.publish(&event.topic, &event.payload).await {
                Ok(()) => {
                    self.outbox
                        .mark_dispatched(&event.id, self.clock.utc())
                        .await
                        .map_err(map_outbox_error)?;
                    debug!(event_id = %event.id, topic = %event.topic, "outbox event published");
                    report.published += 1;
                }
                Err(error) => {
                    let failure = self.failure_for(&event, error.to_string());
                    let parked = failure.retry_at.is_none();
                    self.outbox
                        .record_failure(&event.id, &failure, self.clock.utc())
                        .await
                        .map_err(map_outbox_error)?;
                    if parked {
                        warn!(
                            event_id = %event.id,
                            attempts = failure.attempts,
                            %error,
                            "outbox event parked after repeated delivery failures"
                        );
                        report.parked += 1;
                    } else {
                        warn!(
                            event_id = %event.id,
                            attempts = failure.attempts,
                            %error,
                            "outbox event delivery failed; rescheduled"
                        );
                        report.rescheduled += 1;
                    }
                }
            }
        }
        Ok(report)
    }

    /// Poll until `shutdown` flips to `true` or its sender is dropped.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        info!(
            batch_size = self.config.batch_size,
            poll_ms = u64::try_from(self.config.poll_interval.as_millis()).unwrap_or(u64::MAX),
            "notification dispatcher started"
        );
        loop {
            if *shutdown.borrow() {
                break;
            }
            let full_batch = match self.dispatch_pending().await {
                Ok(report) => {
                    if report.handled() > 0 {
                        info!(
                            published = report.published,
                            rescheduled = report.rescheduled,
                            parked = report.parked,
                            "outbox pass complete"
                        );
                    }
                    report.handled() >= self.config.batch_size.max(1)
                }
                Err(error) => {
                    warn!(%error, "outbox pass failed");
                    false
                }
            };
            if full_batch {
                continue;
            }
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
                () = self.sleeper.sleep(self.config.poll_interval) => {}
            }
        }
        info!("notification dispatcher stopped");
    }

    fn failure_for(&self, event: &OutboxEvent, error: String) -> DeliveryFailure {
        let attempts = event.attempts.saturating_add(1);
        let retry_at = (attempts < self.config.max_attempts.max(1)).then(|| {
            let now = self.clock.utc();
            let delay = self
                .jitter
                .jittered_delay(self.retry_base_delay(attempts), attempts, now);
            TimeDelta::from_std(delay)
                .ok()
                .and_then(|delta| now.checked_add_signed(delta))
                .unwrap_or(now)
        });
        DeliveryFailure {
            attempts,
            error,
            retry_at,
        }
    }

    fn retry_base_delay(&self, attempt: u32) -> Duration {
        let exponent = 2_u32.saturating_pow(attempt.saturating_sub(1));
        let base_ms = u64::try_from(self.config.initial_backoff.as_millis()).unwrap_or(u64::MAX);
        let max_ms = u64::try_from(self.config.max_backoff.as_millis()).unwrap_or(u64::MAX);
        Duration::from_millis(base_ms.saturating_mul(u64::from(exponent)).min(max_ms))
    }
}

fn map_outbox_error(error: OutboxError) -> Error {
    match error {
        OutboxError::Connection { message } => {
            Error::service_unavailable(format!("outbox unavailable: {message}"))
        }
        OutboxError::Query { message } => Error::internal(format!("outbox error: {message}")),
    }
}

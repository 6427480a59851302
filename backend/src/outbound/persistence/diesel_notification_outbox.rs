//! PostgreSQL-backed `NotificationOutbox`.
//!
//! An event is pending while both `dispatched_at` and `failed_at` are null.
//! The partial index `notification_outbox_pending_idx` covers the `due`
//! query.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{NotificationOutbox, OutboxError};
use crate::domain::{DeliveryFailure, OutboxEvent, OutboxEventId};

use super::error_mapping::{map_diesel_error, map_pool_error};
use super::models::OutboxRow;
use super::pool::DbPool;
use super::schema::notification_outbox;

/// Diesel implementation of [`NotificationOutbox`].
#[derive(Clone)]
pub struct DieselNotificationOutbox {
    pool: DbPool,
}

impl DieselNotificationOutbox {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NotificationOutbox for DieselNotificationOutbox {
    async fn due(
        &self,
        now: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<OutboxEvent>, OutboxError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows = notification_outbox::table
            .filter(notification_outbox::dispatched_at.is_null())
            .filter(notification_outbox::failed_at.is_null())
            .filter(notification_outbox::next_attempt_at.le(now))
            .order((
                notification_outbox::created_at.asc(),
                notification_outbox::id.asc(),
            ))
            .limit(i64::try_from(limit).unwrap_or(i64::MAX))
            .select(OutboxRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(OutboxEvent::from).collect())
    }

    async fn mark_dispatched(
        &self,
        id: &OutboxEventId,
        at: DateTime<Utc>,
    ) -> Result<(), OutboxError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::update(notification_outbox::table.find(id.as_uuid()))
            .set(notification_outbox::dispatched_at.eq(Some(at)))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn record_failure(
        &self,
        id: &OutboxEventId,
        failure: &DeliveryFailure,
        at: DateTime<Utc>,
    ) -> Result<(), OutboxError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let attempts = i32::try_from(failure.attempts).unwrap_or(i32::MAX);
        let target = notification_outbox::table.find(id.as_uuid());
        let changes = (
            notification_outbox::attempts.eq(attempts),
            notification_outbox::last_error.eq(Some(failure.error.as_str())),
        );
        let result = match failure.retry_at {
            Some(retry_at) => {
                diesel::update(target)
                    .set((changes, notification_outbox::next_attempt_at.eq(retry_at)))
                    .execute(&mut conn)
                    .await
            }
            None => {
                diesel::update(target)
                    .set((changes, notification_outbox::failed_at.eq(Some(at))))
                    .execute(&mut conn)
                    .await
            }
        };
        result.map(|_| ()).map_err(map_diesel_error)
    }
}

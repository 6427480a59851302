//! PostgreSQL-backed `SubscriptionRepository`.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{SubscriptionPersistenceError, SubscriptionRepository};
use crate::domain::{QuestionId, Subscription};

use super::error_mapping::{map_diesel_error, map_pool_error};
use super::models::SubscriptionRow;
use super::pool::DbPool;
use super::schema::subscriptions;

/// Diesel implementation of [`SubscriptionRepository`].
#[derive(Clone)]
pub struct DieselSubscriptionRepository {
    pool: DbPool,
}

impl DieselSubscriptionRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SubscriptionRepository for DieselSubscriptionRepository {
    async fn subscribe(
        &self,
        subscription: &Subscription,
    ) -> Result<Subscription, SubscriptionPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(subscriptions::table)
            .values(SubscriptionRow::from(subscription))
            .on_conflict((subscriptions::user_id, subscriptions::question_id))
            .do_nothing()
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        // Either the row just written or the one that won the conflict.
        subscriptions::table
            .filter(subscriptions::user_id.eq(subscription.user_id.as_uuid()))
            .filter(subscriptions::question_id.eq(subscription.question_id.as_uuid()))
            .select(SubscriptionRow::as_select())
            .first(&mut conn)
            .await
            .map(Subscription::from)
            .map_err(map_diesel_error)
    }

    async fn list_for_question(
        &self,
        question_id: &QuestionId,
    ) -> Result<Vec<Subscription>, SubscriptionPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows = subscriptions::table
            .filter(subscriptions::question_id.eq(question_id.as_uuid()))
            .order((subscriptions::created_at.asc(), subscriptions::id.asc()))
            .select(SubscriptionRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(Subscription::from).collect())
    }
}

//! PostgreSQL-backed `QuestionRepository`.
//!
//! Counters are incremented in SQL (`SET views = views + 1`) so concurrent
//! votes and views never lose updates.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{QuestionPersistenceError, QuestionRepository};
use crate::domain::{PostText, Question, QuestionId, VoteDirection};

use super::error_mapping::{map_diesel_error, map_pool_error};
use super::models::{NewQuestionRow, QuestionRow};
use super::pool::DbPool;
use super::schema::questions;

/// Diesel implementation of [`QuestionRepository`].
#[derive(Clone)]
pub struct DieselQuestionRepository {
    pool: DbPool,
}

impl DieselQuestionRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn to_domain(row: QuestionRow) -> Result<Question, QuestionPersistenceError> {
    Question::try_from(row).map_err(QuestionPersistenceError::query)
}

fn to_optional_domain(
    row: Option<QuestionRow>,
) -> Result<Option<Question>, QuestionPersistenceError> {
    row.map(to_domain).transpose()
}

#[async_trait]
impl QuestionRepository for DieselQuestionRepository {
    async fn insert(&self, question: &Question) -> Result<(), QuestionPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(questions::table)
            .values(NewQuestionRow::from(question))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn find_by_id(
        &self,
        id: &QuestionId,
    ) -> Result<Option<Question>, QuestionPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = questions::table
            .find(id.as_uuid())
            .select(QuestionRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        to_optional_domain(row)
    }

    async fn list(&self) -> Result<Vec<Question>, QuestionPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        questions::table
            .order((questions::created_at.asc(), questions::id.asc()))
            .select(QuestionRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?
            .into_iter()
            .map(to_domain)
            .collect()
    }

    async fn update_text(
        &self,
        id: &QuestionId,
        text: &PostText,
        now: DateTime<Utc>,
    ) -> Result<Option<Question>, QuestionPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = diesel::update(questions::table.find(id.as_uuid()))
            .set((
                questions::text.eq(text.as_ref()),
                questions::updated_at.eq(now),
            ))
            .returning(QuestionRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        to_optional_domain(row)
    }

    async fn record_vote(
        &self,
        id: &QuestionId,
        direction: VoteDirection,
        now: DateTime<Utc>,
    ) -> Result<Option<Question>, QuestionPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let target = questions::table.find(id.as_uuid());
        let row = match direction {
            VoteDirection::Up => {
                diesel::update(target)
                    .set((
                        questions::up_votes.eq(questions::up_votes + 1),
                        questions::updated_at.eq(now),
                    ))
                    .returning(QuestionRow::as_returning())
                    .get_result(&mut conn)
                    .await
            }
            VoteDirection::Down => {
                diesel::update(target)
                    .set((
                        questions::down_votes.eq(questions::down_votes + 1),
                        questions::updated_at.eq(now),
                    ))
                    .returning(QuestionRow::as_returning())
                    .get_result(&mut conn)
                    .await
            }
        }
        .optional()
        .map_err(map_diesel_error)?;
        to_optional_domain(row)
    }

    async fn record_view(
        &self,
        id: &QuestionId,
    ) -> Result<Option<Question>, QuestionPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        // Views leave `updated_at` alone; reading is not an edit.
        let row = diesel::update(questions::table.find(id.as_uuid()))
            .set(questions::views.eq(questions::views + 1))
            .returning(QuestionRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        to_optional_domain(row)
    }
}

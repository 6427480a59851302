//! PostgreSQL-backed `AnswerRepository`.
//!
//! Recording an answer touches three tables in one transaction: the answer
//! row, the parent question's `answer_ids`, and the notification outbox.
//! The question row is locked first so a concurrent answer to the same
//! question serialises behind it.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::sql_types::{Timestamptz, Uuid as SqlUuid};
use diesel_async::scoped_futures::ScopedFutureExt as _;
use diesel_async::{AsyncConnection as _, RunQueryDsl};
use uuid::Uuid;

use crate::domain::ports::{AnswerPersistenceError, AnswerRepository};
use crate::domain::{Answer, AnswerId, OutboxEvent, PostText, QuestionId, VoteDirection};

use super::error_mapping::{map_diesel_error, map_pool_error};
use super::models::{AnswerRow, NewAnswerRow, NewOutboxRow};
use super::pool::DbPool;
use super::schema::{answers, notification_outbox, questions};

/// Adds `$1` to the question's answer set unless it is already present.
const APPEND_ANSWER_ID: &str = "UPDATE questions \
     SET answer_ids = array_append(answer_ids, $1), updated_at = $2 \
     WHERE id = $3 AND NOT ($1 = ANY(answer_ids))";

/// Diesel implementation of [`AnswerRepository`].
#[derive(Clone)]
pub struct DieselAnswerRepository {
    pool: DbPool,
}

impl DieselAnswerRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Reasons the answer transaction rolls back.
#[derive(Debug)]
enum RecordFailure {
    QuestionMissing,
    Database(diesel::result::Error),
}

impl From<diesel::result::Error> for RecordFailure {
    fn from(error: diesel::result::Error) -> Self {
        Self::Database(error)
    }
}

fn to_domain(row: AnswerRow) -> Result<Answer, AnswerPersistenceError> {
    Answer::try_from(row).map_err(AnswerPersistenceError::query)
}

#[async_trait]
impl AnswerRepository for DieselAnswerRepository {
    async fn record(
        &self,
        answer: &Answer,
        event: &OutboxEvent,
    ) -> Result<(), AnswerPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let question_id = *answer.question_id.as_uuid();
        let answer_id = *answer.id.as_uuid();

        let outcome = conn
            .transaction::<_, RecordFailure, _>(|conn| {
                async move {
                    let locked: Option<Uuid> = questions::table
                        .find(question_id)
                        .select(questions::id)
                        .for_update()
                        .first(conn)
                        .await
                        .optional()?;
                    if locked.is_none() {
                        return Err(RecordFailure::QuestionMissing);
                    }

                    diesel::insert_into(answers::table)
                        .values(NewAnswerRow::from(answer))
                        .execute(conn)
                        .await?;
                    diesel::sql_query(APPEND_ANSWER_ID)
                        .bind::<SqlUuid, _>(answer_id)
                        .bind::<Timestamptz, _>(answer.created_at)
                        .bind::<SqlUuid, _>(question_id)
                        .execute(conn)
                        .await?;
                    diesel::insert_into(notification_outbox::table)
                        .values(NewOutboxRow::from(event))
                        .execute(conn)
                        .await?;
                    Ok(())
                }
                .scope_boxed()
            })
            .await;

        match outcome {
            Ok(()) => Ok(()),
            Err(RecordFailure::QuestionMissing) => Err(AnswerPersistenceError::question_missing(
                answer.question_id.to_string(),
            )),
            Err(RecordFailure::Database(error)) => Err(map_diesel_error(error)),
        }
    }

    async fn find_by_id(&self, id: &AnswerId) -> Result<Option<Answer>, AnswerPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        answers::table
            .find(id.as_uuid())
            .select(AnswerRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
            .map(to_domain)
            .transpose()
    }

    async fn list(&self) -> Result<Vec<Answer>, AnswerPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        answers::table
            .order((answers::created_at.asc(), answers::id.asc()))
            .select(AnswerRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?
            .into_iter()
            .map(to_domain)
            .collect()
    }

    async fn list_for_question(
        &self,
        question_id: &QuestionId,
    ) -> Result<Vec<Answer>, AnswerPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        answers::table
            .filter(answers::question_id.eq(question_id.as_uuid()))
            .order((answers::created_at.asc(), answers::id.asc()))
            .select(AnswerRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?
            .into_iter()
            .map(to_domain)
            .collect()
    }

    async fn update_text(
        &self,
        id: &AnswerId,
        text: &PostText,
        now: DateTime<Utc>,
    ) -> Result<Option<Answer>, AnswerPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::update(answers::table.find(id.as_uuid()))
            .set((answers::text.eq(text.as_ref()), answers::updated_at.eq(now)))
            .returning(AnswerRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
            .map(to_domain)
            .transpose()
    }

    async fn record_vote(
        &self,
        id: &AnswerId,
        direction: VoteDirection,
        now: DateTime<Utc>,
    ) -> Result<Option<Answer>, AnswerPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let target = answers::table.find(id.as_uuid());
        let row = match direction {
            VoteDirection::Up => {
                diesel::update(target)
                    .set((
                        answers::up_votes.eq(answers::up_votes + 1),
                        answers::updated_at.eq(now),
                    ))
                    .returning(AnswerRow::as_returning())
                    .get_result(&mut conn)
                    .await
            }
            VoteDirection::Down => {
                diesel::update(target)
                    .set((
                        answers::down_votes.eq(answers::down_votes + 1),
                        answers::updated_at.eq(now),
                    ))
                    .returning(AnswerRow::as_returning())
                    .get_result(&mut conn)
                    .await
            }
        }
        .optional()
        .map_err(map_diesel_error)?;
        row.map(to_domain).transpose()
    }
}

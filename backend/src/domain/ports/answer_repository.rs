//! Port for answer persistence, including the atomic answer-recording unit.
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{Answer, AnswerId, OutboxEvent, PostText, QuestionId, VoteDirection};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by answer repository adapters.
    pub enum AnswerPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "answer repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "answer repository query failed: {message}",
        /// The referenced question vanished before the answer was recorded.
        QuestionMissing { question_id: String } => "question {question_id} does not exist",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AnswerRepository: Send + Sync {
    /// Record `answer` as one unit: insert the answer, add its id to the
    /// question's answer set, and enqueue `event` in the outbox. Nothing is
    /// written when the question does not exist.
    async fn record(
        &self,
        answer: &Answer,
        event: &OutboxEvent,
    ) -> Result<(), AnswerPersistenceError>;

    async fn find_by_id(&self, id: &AnswerId) -> Result<Option<Answer>, AnswerPersistenceError>;

    /// All answers, oldest first.
    async fn list(&self) -> Result<Vec<Answer>, AnswerPersistenceError>;

    /// Answers for one question, oldest first.
    async fn list_for_question(
        &self,
        question_id: &QuestionId,
    ) -> Result<Vec<Answer>, AnswerPersistenceError>;

    async fn update_text(
        &self,
        id: &AnswerId,
        text: &PostText,
        now: DateTime<Utc>,
    ) -> Result<Option<Answer>, AnswerPersistenceError>;

    async fn record_vote(
        &self,
        id: &AnswerId,
        direction: VoteDirection,
        now: DateTime<Utc>,
    ) -> Result<Option<Answer>, AnswerPersistenceError>;
}

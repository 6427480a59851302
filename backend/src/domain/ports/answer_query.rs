//! Driving port for reading answers.

use async_trait::async_trait;

use crate::domain::{Answer, AnswerId, Error, QuestionId};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AnswerQuery: Send + Sync {
    async fn list_answers(&self) -> Result<Vec<Answer>, Error>;

    async fn get_answer(&self, id: &AnswerId) -> Result<Answer, Error>;

    /// Answers for one question; empty when the question has none.
    async fn answers_for_question(&self, question_id: &QuestionId) -> Result<Vec<Answer>, Error>;
}

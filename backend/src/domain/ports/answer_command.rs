//! Driving port for answer mutations.

use async_trait::async_trait;

use crate::domain::{Answer, AnswerId, Caller, Error, PostText, QuestionId, VoteDirection};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AnswerCommand: Send + Sync {
    /// Answer an existing question and schedule subscriber notification.
    async fn answer(
        &self,
        caller: &Caller,
        question_id: &QuestionId,
        text: PostText,
    ) -> Result<Answer, Error>;

    /// Replace the text. Owner or admin only.
    async fn edit(&self, caller: &Caller, id: &AnswerId, text: PostText) -> Result<Answer, Error>;

    async fn vote(&self, id: &AnswerId, direction: VoteDirection) -> Result<Answer, Error>;
}

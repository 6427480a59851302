//! Driving port for question mutations.

use async_trait::async_trait;

use crate::domain::{Caller, Error, PostText, Question, QuestionId, VoteDirection};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QuestionCommand: Send + Sync {
    /// Post a question owned by `caller`.
    async fn ask(&self, caller: &Caller, text: PostText) -> Result<Question, Error>;

    /// Replace the text. Owner or admin only.
    async fn edit(
        &self,
        caller: &Caller,
        id: &QuestionId,
        text: PostText,
    ) -> Result<Question, Error>;

    /// Any member may vote, repeatedly.
    async fn vote(&self, id: &QuestionId, direction: VoteDirection) -> Result<Question, Error>;
}

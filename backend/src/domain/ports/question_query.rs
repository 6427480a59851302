//! Driving port for reading questions.

use async_trait::async_trait;

use crate::domain::{Error, Question, QuestionId};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QuestionQuery: Send + Sync {
    async fn list_questions(&self) -> Result<Vec<Question>, Error>;

    /// Fetch a question, counting the read as a view.
    async fn view_question(&self, id: &QuestionId) -> Result<Question, Error>;
}

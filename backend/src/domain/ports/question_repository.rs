//! Port for question persistence.
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{PostText, Question, QuestionId, VoteDirection};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by question repository adapters.
    pub enum QuestionPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "question repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "question repository query failed: {message}",
    }
}

/// Question storage.
///
/// Counter mutations are single atomic statements in the store; adapters
/// must never read a counter and write it back.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QuestionRepository: Send + Sync {
    async fn insert(&self, question: &Question) -> Result<(), QuestionPersistenceError>;

    async fn find_by_id(
        &self,
        id: &QuestionId,
    ) -> Result<Option<Question>, QuestionPersistenceError>;

    /// All questions, oldest first.
    async fn list(&self) -> Result<Vec<Question>, QuestionPersistenceError>;

    /// Replace the text. Returns `None` when the question does not exist.
    async fn update_text(
        &self,
        id: &QuestionId,
        text: &PostText,
        now: DateTime<Utc>,
    ) -> Result<Option<Question>, QuestionPersistenceError>;

    /// Increment the counter selected by `direction`.
    async fn record_vote(
        &self,
        id: &QuestionId,
        direction: VoteDirection,
        now: DateTime<Utc>,
    ) -> Result<Option<Question>, QuestionPersistenceError>;

    /// Increment the view counter.
    async fn record_view(
        &self,
        id: &QuestionId,
    ) -> Result<Option<Question>, QuestionPersistenceError>;
}

//! Port for question subscriptions.
use async_trait::async_trait;

use crate::domain::{QuestionId, Subscription};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by subscription repository adapters.
    pub enum SubscriptionPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "subscription repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "subscription repository query failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SubscriptionRepository: Send + Sync {
    /// Store `subscription` unless the pair already exists, and return the
    /// stored row (the existing one on duplicates).
    async fn subscribe(
        &self,
        subscription: &Subscription,
    ) -> Result<Subscription, SubscriptionPersistenceError>;

    /// Subscriptions for a question, oldest first.
    async fn list_for_question(
        &self,
        question_id: &QuestionId,
    ) -> Result<Vec<Subscription>, SubscriptionPersistenceError>;
}

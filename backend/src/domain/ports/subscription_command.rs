//! Driving port for question subscriptions.

use async_trait::async_trait;

use crate::domain::{Caller, Error, QuestionId, Subscription};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SubscriptionCommand: Send + Sync {
    /// Subscribe the caller. Re-subscribing returns the existing row.
    async fn subscribe(
        &self,
        caller: &Caller,
        question_id: &QuestionId,
    ) -> Result<Subscription, Error>;

    /// Admin only.
    async fn subscribers(
        &self,
        caller: &Caller,
        question_id: &QuestionId,
    ) -> Result<Vec<Subscription>, Error>;
}

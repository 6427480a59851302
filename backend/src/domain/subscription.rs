//! Question subscriptions.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{QuestionId, SubscriptionId, UserId};

/// "This user wants notifications about this question."
///
/// At most one subscription exists per `(user_id, question_id)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    pub id: SubscriptionId,
    pub user_id: UserId,
    pub question_id: QuestionId,
    pub created_at: DateTime<Utc>,
}

impl Subscription {
    pub fn new(user_id: UserId, question_id: QuestionId, now: DateTime<Utc>) -> Self {
        Self {
            id: SubscriptionId::random(),
            user_id,
            question_id,
            created_at: now,
        }
    }
}

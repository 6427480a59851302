//! Outbox events awaiting delivery to the message broker.

use chrono::{DateTime, Utc};
use serde_json::{Value, json};

use super::{AnswerId, OutboxEventId, QuestionId};

/// Queue consumed by the subscriber notification worker.
pub const QUESTION_ANSWERED_QUEUE: &str = "notify-subscribers-to-question";
/// Queue consumed by the mail worker for password reset links.
pub const PASSWORD_RESET_QUEUE: &str = "send-password-reset-email";

/// A message recorded alongside a state change and delivered later.
#[derive(Debug, Clone, PartialEq)]
pub struct OutboxEvent {
    pub id: OutboxEventId,
    /// Destination queue name.
    pub topic: String,
    pub payload: Value,
    /// Delivery attempts made so far.
    pub attempts: u32,
    pub created_at: DateTime<Utc>,
}

impl OutboxEvent {
    /// Event announcing that `question_id` received `answer_id`.
    ///
    /// # Examples
    /// ```
    /// use chrono::Utc;
    /// use qanda::domain::{AnswerId, OutboxEvent, QuestionId, QUESTION_ANSWERED_QUEUE};
    ///
    /// let question = QuestionId::random();
    /// let event = OutboxEvent::question_answered(question, AnswerId::random(), Utc::now());
    /// assert_eq!(event.topic, QUESTION_ANSWERED_QUEUE);
    /// assert_eq!(event.payload["question"], question.to_string());
    /// ```
    pub fn question_answered(
        question_id: QuestionId,
        answer_id: AnswerId,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: OutboxEventId::random(),
            topic: QUESTION_ANSWERED_QUEUE.to_owned(),
            payload: json!({
                "question": question_id,
                "answer": answer_id,
            }),
            attempts: 0,
            created_at: now,
        }
    }
}

/// Delivery failure bookkeeping for an outbox event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryFailure {
    pub attempts: u32,
    pub error: String,
    /// When to try again. `None` parks the event permanently.
    pub retry_at: Option<DateTime<Utc>>,
}

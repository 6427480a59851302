//! Answers to questions.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{AnswerId, PostText, QuestionId, UserId};

/// An answer, persisted independently of the question it references.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Answer {
    pub id: AnswerId,
    pub text: PostText,
    pub author_id: UserId,
    pub question_id: QuestionId,
    pub up_votes: u64,
    pub down_votes: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Answer {
    pub fn new(
        author_id: UserId,
        question_id: QuestionId,
        text: PostText,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: AnswerId::random(),
            text,
            author_id,
            question_id,
            up_votes: 0,
            down_votes: 0,
            created_at: now,
            updated_at: now,
        }
    }
}

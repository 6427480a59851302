//! Questions and the text body shared with answers.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{AnswerId, QuestionId, UserId};

/// Raised when a question or answer body is blank.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("text must not be empty")]
pub struct EmptyPostText;

/// Body of a question or answer. Trimmed and non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PostText(String);

impl PostText {
    pub fn new(raw: impl AsRef<str>) -> Result<Self, EmptyPostText> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(EmptyPostText);
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for PostText {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

/// A question posted by a user.
///
/// ## Invariants
/// - `answer_ids` holds each answer at most once, in the order the answers
///   were recorded.
/// - Counters only grow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: QuestionId,
    pub text: PostText,
    pub author_id: UserId,
    pub views: u64,
    pub up_votes: u64,
    pub down_votes: u64,
    pub answer_ids: Vec<AnswerId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Question {
    /// A fresh question with zeroed counters and no answers.
    pub fn new(author_id: UserId, text: PostText, now: DateTime<Utc>) -> Self {
        Self {
            id: QuestionId::random(),
            text,
            author_id,
            views: 0,
            up_votes: 0,
            down_votes: 0,
            answer_ids: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", false)]
    #[case("   \n", false)]
    #[case(" Why? ", true)]
    fn text_must_not_be_blank(#[case] raw: &str, #[case] accepted: bool) {
        assert_eq!(PostText::new(raw).is_ok(), accepted);
    }

    #[test]
    fn new_question_starts_empty() {
        let author = UserId::random();
        let now = Utc::now();
        let question = Question::new(author, PostText::new("Q1").expect("text"), now);
        assert_eq!(question.author_id, author);
        assert_eq!((question.views, question.up_votes, question.down_votes), (0, 0, 0));
        assert!(question.answer_ids.is_empty());

        let json = serde_json::to_value(&question).expect("serialise");
        assert_eq!(json["text"], "Q1");
        assert_eq!(json["authorId"], author.to_string());
        assert_eq!(json["answerIds"], serde_json::json!([]));
    }
}

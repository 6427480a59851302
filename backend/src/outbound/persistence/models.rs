//! Internal Diesel row structs and their conversions to domain entities.
//!
//! Rows never leave the persistence layer. Conversions re-validate text
//! columns through the domain constructors, so a row that breaks an entity
//! invariant surfaces as a query error instead of an invalid entity.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::{
    Answer, AnswerId, EmailAddress, OutboxEvent, OutboxEventId, PasswordDigest, PersonName,
    PostText, Question, QuestionId, Subscription, SubscriptionId, User, UserId,
};

use super::schema::{answers, notification_outbox, questions, subscriptions, users};

/// Counters are `CHECK (>= 0)` in the schema.
fn counter(value: i64) -> u64 {
    u64::try_from(value).unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub firstname: String,
    pub lastname: String,
    pub email: String,
    pub password_hash: String,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = String;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let invalid = |err: crate::domain::UserValidationError| format!("user {}: {err}", row.id);
        Ok(Self {
            id: UserId::from_uuid(row.id),
            firstname: PersonName::firstname(&row.firstname).map_err(invalid)?,
            lastname: PersonName::lastname(&row.lastname).map_err(invalid)?,
            email: EmailAddress::new(&row.email).map_err(invalid)?,
            password: PasswordDigest::new(row.password_hash),
            is_admin: row.is_admin,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Insert and full-update shape for users.
#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = users)]
pub(crate) struct UserRecord<'a> {
    pub id: Uuid,
    pub firstname: &'a str,
    pub lastname: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl<'a> From<&'a User> for UserRecord<'a> {
    fn from(user: &'a User) -> Self {
        Self {
            id: *user.id.as_uuid(),
            firstname: user.firstname.as_ref(),
            lastname: user.lastname.as_ref(),
            email: user.email.as_ref(),
            password_hash: user.password.as_str(),
            is_admin: user.is_admin,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Questions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = questions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct QuestionRow {
    pub id: Uuid,
    pub text: String,
    pub author_id: Uuid,
    pub views: i64,
    pub up_votes: i64,
    pub down_votes: i64,
    pub answer_ids: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<QuestionRow> for Question {
    type Error = String;

    fn try_from(row: QuestionRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: QuestionId::from_uuid(row.id),
            text: PostText::new(&row.text).map_err(|err| format!("question {}: {err}", row.id))?,
            author_id: UserId::from_uuid(row.author_id),
            views: counter(row.views),
            up_votes: counter(row.up_votes),
            down_votes: counter(row.down_votes),
            answer_ids: row.answer_ids.into_iter().map(AnswerId::from_uuid).collect(),
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = questions)]
pub(crate) struct NewQuestionRow<'a> {
    pub id: Uuid,
    pub text: &'a str,
    pub author_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl<'a> From<&'a Question> for NewQuestionRow<'a> {
    fn from(question: &'a Question) -> Self {
        Self {
            id: *question.id.as_uuid(),
            text: question.text.as_ref(),
            author_id: *question.author_id.as_uuid(),
            created_at: question.created_at,
            updated_at: question.updated_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Answers
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = answers)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct AnswerRow {
    pub id: Uuid,
    pub text: String,
    pub author_id: Uuid,
    pub question_id: Uuid,
    pub up_votes: i64,
    pub down_votes: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<AnswerRow> for Answer {
    type Error = String;

    fn try_from(row: AnswerRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: AnswerId::from_uuid(row.id),
            text: PostText::new(&row.text).map_err(|err| format!("answer {}: {err}", row.id))?,
            author_id: UserId::from_uuid(row.author_id),
            question_id: QuestionId::from_uuid(row.question_id),
            up_votes: counter(row.up_votes),
            down_votes: counter(row.down_votes),
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = answers)]
pub(crate) struct NewAnswerRow<'a> {
    pub id: Uuid,
    pub text: &'a str,
    pub author_id: Uuid,
    pub question_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl<'a> From<&'a Answer> for NewAnswerRow<'a> {
    fn from(answer: &'a Answer) -> Self {
        Self {
            id: *answer.id.as_uuid(),
            text: answer.text.as_ref(),
            author_id: *answer.author_id.as_uuid(),
            question_id: *answer.question_id.as_uuid(),
            created_at: answer.created_at,
            updated_at: answer.updated_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Subscriptions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = subscriptions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct SubscriptionRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub question_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl From<SubscriptionRow> for Subscription {
    fn from(row: SubscriptionRow) -> Self {
        Self {
            id: SubscriptionId::from_uuid(row.id),
            user_id: UserId::from_uuid(row.user_id),
            question_id: QuestionId::from_uuid(row.question_id),
            created_at: row.created_at,
        }
    }
}

impl From<&Subscription> for SubscriptionRow {
    fn from(subscription: &Subscription) -> Self {
        Self {
            id: *subscription.id.as_uuid(),
            user_id: *subscription.user_id.as_uuid(),
            question_id: *subscription.question_id.as_uuid(),
            created_at: subscription.created_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Notification outbox
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = notification_outbox)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct OutboxRow {
    pub id: Uuid,
    pub topic: String,
    pub payload: serde_json::Value,
    pub attempts: i32,
    pub created_at: DateTime<Utc>,
}

impl From<OutboxRow> for OutboxEvent {
    fn from(row: OutboxRow) -> Self {
        Self {
            id: OutboxEventId::from_uuid(row.id),
            topic: row.topic,
            payload: row.payload,
            attempts: u32::try_from(row.attempts).unwrap_or_default(),
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = notification_outbox)]
pub(crate) struct NewOutboxRow<'a> {
    pub id: Uuid,
    pub topic: &'a str,
    pub payload: &'a serde_json::Value,
    pub next_attempt_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl<'a> From<&'a OutboxEvent> for NewOutboxRow<'a> {
    fn from(event: &'a OutboxEvent) -> Self {
        Self {
            id: *event.id.as_uuid(),
            topic: event.topic.as_str(),
            payload: &event.payload,
            next_attempt_at: event.created_at,
            created_at: event.created_at,
        }
    }
}

//! Process-local store implementing every repository port.
//!
//! Used when no database URL is configured and by the HTTP integration
//! tests. All state sits behind one mutex, so multi-step writes such as
//! recording an answer are atomic with respect to other callers. Nothing
//! survives a restart.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::ports::{
    AnswerPersistenceError, AnswerRepository, NotificationOutbox, OutboxError,
    QuestionPersistenceError, QuestionRepository, SubscriptionPersistenceError,
    SubscriptionRepository, UserPersistenceError, UserRepository,
};
use crate::domain::{
    Answer, AnswerId, DeliveryFailure, EmailAddress, OutboxEvent, OutboxEventId, PostText,
    Question, QuestionId, Subscription, User, UserId, VoteDirection,
};

#[derive(Debug, Clone)]
struct OutboxEntry {
    event: OutboxEvent,
    next_attempt_at: DateTime<Utc>,
    last_error: Option<String>,
    dispatched_at: Option<DateTime<Utc>>,
    failed_at: Option<DateTime<Utc>>,
}

impl OutboxEntry {
    fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.dispatched_at.is_none() && self.failed_at.is_none() && self.next_attempt_at <= now
    }
}

/// Vectors keep insertion order, which doubles as creation order.
#[derive(Debug, Default)]
struct State {
    users: Vec<User>,
    questions: Vec<Question>,
    answers: Vec<Answer>,
    subscriptions: Vec<Subscription>,
    outbox: Vec<OutboxEntry>,
}

impl State {
    fn question_mut(&mut self, id: &QuestionId) -> Option<&mut Question> {
        self.questions.iter_mut().find(|question| question.id == *id)
    }

    fn answer_mut(&mut self, id: &AnswerId) -> Option<&mut Answer> {
        self.answers.iter_mut().find(|answer| answer.id == *id)
    }

    fn outbox_mut(&mut self, id: &OutboxEventId) -> Option<&mut OutboxEntry> {
        self.outbox.iter_mut().find(|entry| entry.event.id == *id)
    }
}

/// In-memory implementation of the user, question, answer, subscription,
/// and outbox ports. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    state: Arc<Mutex<State>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        // Every mutation completes before the guard drops, so a poisoned
        // lock still holds consistent state.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn bump(counter: &mut u64) {
    *counter = counter.saturating_add(1);
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn insert(&self, user: &User) -> Result<(), UserPersistenceError> {
        let mut state = self.state();
        if state.users.iter().any(|existing| existing.email == user.email) {
            return Err(UserPersistenceError::duplicate_email());
        }
        state.users.push(user.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        Ok(self.state().users.iter().find(|user| user.id == *id).cloned())
    }

    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<User>, UserPersistenceError> {
        Ok(self
            .state()
            .users
            .iter()
            .find(|user| user.email == *email)
            .cloned())
    }

    async fn list(&self) -> Result<Vec<User>, UserPersistenceError> {
        Ok(self.state().users.clone())
    }

    async fn update(&self, user: &User) -> Result<(), UserPersistenceError> {
        let mut state = self.state();
        if state
            .users
            .iter()
            .any(|other| other.id != user.id && other.email == user.email)
        {
            return Err(UserPersistenceError::duplicate_email());
        }
        let stored = state
            .users
            .iter_mut()
            .find(|existing| existing.id == user.id)
            .ok_or_else(UserPersistenceError::missing)?;
        *stored = User {
            created_at: stored.created_at,
            ..user.clone()
        };
        Ok(())
    }
}

#[async_trait]
impl QuestionRepository for InMemoryStore {
    async fn insert(&self, question: &Question) -> Result<(), QuestionPersistenceError> {
        self.state().questions.push(question.clone());
        Ok(())
    }

    async fn find_by_id(
        &self,
        id: &QuestionId,
    ) -> Result<Option<Question>, QuestionPersistenceError> {
        Ok(self.state().question_mut(id).map(|question| question.clone()))
    }

    async fn list(&self) -> Result<Vec<Question>, QuestionPersistenceError> {
        Ok(self.state().questions.clone())
    }

    async fn update_text(
        &self,
        id: &QuestionId,
        text: &PostText,
        now: DateTime<Utc>,
    ) -> Result<Option<Question>, QuestionPersistenceError> {
        let mut state = self.state();
        Ok(state.question_mut(id).map(|question| {
            question.text = text.clone();
            question.updated_at = now;
            question.clone()
        }))
    }

    async fn record_vote(
        &self,
        id: &QuestionId,
        direction: VoteDirection,
        now: DateTime<Utc>,
    ) -> Result<Option<Question>, QuestionPersistenceError> {
        let mut state = self.state();
        Ok(state.question_mut(id).map(|question| {
            match direction {
                VoteDirection::Up => bump(&mut question.up_votes),
                VoteDirection::Down => bump(&mut question.down_votes),
            }
            question.updated_at = now;
            question.clone()
        }))
    }

    async fn record_view(
        &self,
        id: &QuestionId,
    ) -> Result<Option<Question>, QuestionPersistenceError> {
        let mut state = self.state();
        Ok(state.question_mut(id).map(|question| {
            bump(&mut question.views);
            question.clone()
        }))
    }
}

#[async_trait]
impl AnswerRepository for InMemoryStore {
    async fn record(
        &self,
        answer: &Answer,
        event: &OutboxEvent,
    ) -> Result<(), AnswerPersistenceError> {
        let mut state = self.state();
        let question = state.question_mut(&answer.question_id).ok_or_else(|| {
            AnswerPersistenceError::question_missing(answer.question_id.to_string())
        })?;
        if !question.answer_ids.contains(&answer.id) {
            question.answer_ids.push(answer.id);
            question.updated_at = answer.created_at;
        }
        state.answers.push(answer.clone());
        state.outbox.push(OutboxEntry {
            event: event.clone(),
            next_attempt_at: event.created_at,
            last_error: None,
            dispatched_at: None,
            failed_at: None,
        });
        Ok(())
    }

    async fn find_by_id(&self, id: &AnswerId) -> Result<Option<Answer>, AnswerPersistenceError> {
        Ok(self.state().answer_mut(id).map(|answer| answer.clone()))
    }

    async fn list(&self) -> Result<Vec<Answer>, AnswerPersistenceError> {
        Ok(self.state().answers.clone())
    }

    async fn list_for_question(
        &self,
        question_id: &QuestionId,
    ) -> Result<Vec<Answer>, AnswerPersistenceError> {
        Ok(self
            .state()
            .answers
            .iter()
            .filter(|answer| answer.question_id == *question_id)
            .cloned()
            .collect())
    }

    async fn update_text(
        &self,
        id: &AnswerId,
        text: &PostText,
        now: DateTime<Utc>,
    ) -> Result<Option<Answer>, AnswerPersistenceError> {
        let mut state = self.state();
        Ok(state.answer_mut(id).map(|answer| {
            answer.text = text.clone();
            answer.updated_at = now;
            answer.clone()
        }))
    }

    async fn record_vote(
        &self,
        id: &AnswerId,
        direction: VoteDirection,
        now: DateTime<Utc>,
    ) -> Result<Option<Answer>, AnswerPersistenceError> {
        let mut state = self.state();
        Ok(state.answer_mut(id).map(|answer| {
            match direction {
                VoteDirection::Up => bump(&mut answer.up_votes),
                VoteDirection::Down => bump(&mut answer.down_votes),
            }
            answer.updated_at = now;
            answer.clone()
        }))
    }
}

#[async_trait]
impl SubscriptionRepository for InMemoryStore {
    async fn subscribe(
        &self,
        subscription: &Subscription,
    ) -> Result<Subscription, SubscriptionPersistenceError> {
        let mut state = self.state();
        if let Some(existing) = state.subscriptions.iter().find(|existing| {
            existing.user_id == subscription.user_id
                && existing.question_id == subscription.question_id
        }) {
            return Ok(existing.clone());
        }
        state.subscriptions.push(subscription.clone());
        Ok(subscription.clone())
    }

    async fn list_for_question(
        &self,
        question_id: &QuestionId,
    ) -> Result<Vec<Subscription>, SubscriptionPersistenceError> {
        Ok(self
            .state()
            .subscriptions
            .iter()
            .filter(|subscription| subscription.question_id == *question_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl NotificationOutbox for InMemoryStore {
    async fn due(
        &self,
        now: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<OutboxEvent>, OutboxError> {
        let state = self.state();
        let mut due: Vec<&OutboxEntry> = state.outbox.iter().filter(|e| e.is_due(now)).collect();
        due.sort_by_key(|entry| entry.event.created_at);
        Ok(due
            .into_iter()
            .take(limit)
            .map(|entry| entry.event.clone())
            .collect())
    }

    async fn mark_dispatched(
        &self,
        id: &OutboxEventId,
        at: DateTime<Utc>,
    ) -> Result<(), OutboxError> {
        if let Some(entry) = self.state().outbox_mut(id) {
            entry.dispatched_at = Some(at);
        }
        Ok(())
    }

    async fn record_failure(
        &self,
        id: &OutboxEventId,
        failure: &DeliveryFailure,
        at: DateTime<Utc>,
    ) -> Result<(), OutboxError> {
        if let Some(entry) = self.state().outbox_mut(id) {
            entry.event.attempts = failure.attempts;
            entry.last_error = Some(failure.error.clone());
            match failure.retry_at {
                Some(retry_at) => entry.next_attempt_at = retry_at,
                None => entry.failed_at = Some(at),
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests;

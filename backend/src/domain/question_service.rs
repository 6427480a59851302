//! Question use-cases: ask, edit, vote, list, and view.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;

use super::ports::{
    QuestionCommand, QuestionQuery, QuestionRepository, SearchKind,
};
use super::store_errors::question_store;
use super::{
    Caller, Error, PostText, Question, QuestionId, Role, SearchMirror, VoteDirection, authorize,
};

const NOT_FOUND: &str = "Question not found";

/// Question service implementing the question driving ports.
#[derive(Clone)]
pub struct QuestionService<Q> {
    questions: Arc<Q>,
    search: SearchMirror,
    clock: Arc<dyn Clock>,
}

impl<Q> QuestionService<Q> {
    pub fn new(questions: Arc<Q>, search: SearchMirror, clock: Arc<dyn Clock>) -> Self {
        Self {
            questions,
            search,
            clock,
        }
    }
}

impl<Q: QuestionRepository> QuestionService<Q> {
    async fn existing(&self, id: &QuestionId) -> Result<Question, Error> {
        self.questions
            .find_by_id(id)
            .await
            .map_err(question_store)?
            .ok_or_else(|| Error::not_found(NOT_FOUND))
    }
}

#[async_trait]
impl<Q: QuestionRepository> QuestionCommand for QuestionService<Q> {
    async fn ask(&self, caller: &Caller, text: PostText) -> Result<Question, Error> {
        let question = Question::new(caller.user_id, text, self.clock.utc());
        self.questions
            .insert(&question)
            .await
            .map_err(question_store)?;
        self.search.entity(SearchKind::Question, &question).await;
        Ok(question)
    }

    async fn edit(
        &self,
        caller: &Caller,
        id: &QuestionId,
        text: PostText,
    ) -> Result<Question, Error> {
        let current = self.existing(id).await?;
        if !authorize(caller, Some(&current.author_id), Role::Member).is_allowed() {
            return Err(Error::unauthorized(
                "You do not have required permission to update this question",
            ));
        }
        let updated = self
            .questions
            .update_text(id, &text, self.clock.utc())
            .await
            .map_err(question_store)?
            .ok_or_else(|| Error::not_found(NOT_FOUND))?;
        self.search.entity(SearchKind::Question, &updated).await;
        Ok(updated)
    }

    async fn vote(&self, id: &QuestionId, direction: VoteDirection) -> Result<Question, Error> {
        self.questions
            .record_vote(id, direction, self.clock.utc())
            .await
            .map_err(question_store)?
            .ok_or_else(|| Error::not_found(NOT_FOUND))
    }
}

#[async_trait]
impl<Q: QuestionRepository> QuestionQuery for QuestionService<Q> {
    async fn list_questions(&self) -> Result<Vec<Question>, Error> {
        self.questions.list().await.map_err(question_store)
    }

    async fn view_question(&self, id: &QuestionId) -> Result<Question, Error> {
        self.questions
            .record_view(id)
            .await
            .map_err(question_store)?
            .ok_or_else(|| Error::not_found(NOT_FOUND))
    }
}

//! Answer use-cases.
//!
//! Answering a question is the one workflow that touches two aggregates and
//! a side effect: the answer row, the question's `answer_ids` set, and the
//! "question answered" notification. The service confirms the question
//! exists before writing anything, then hands all three writes to
//! [`AnswerRepository::record`] as a single unit. Delivery of the
//! notification happens later, from the outbox, and never affects the
//! response.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::info;

use super::ports::{AnswerCommand, AnswerQuery, AnswerRepository, QuestionRepository, SearchKind};
use super::store_errors::{answer_store, question_store};
use super::{
    Answer, AnswerId, Caller, Error, OutboxEvent, PostText, QuestionId, Role, SearchMirror,
    VoteDirection, authorize,
};

const ANSWER_NOT_FOUND: &str = "Answer not found";
const QUESTION_NOT_FOUND: &str = "Question not found";

/// Answer service implementing the answer driving ports.
#[derive(Clone)]
pub struct AnswerService<Q, A> {
    questions: Arc<Q>,
    answers: Arc<A>,
    search: SearchMirror,
    clock: Arc<dyn Clock>,
}

impl<Q, A> AnswerService<Q, A> {
    pub fn new(
        questions: Arc<Q>,
        answers: Arc<A>,
        search: SearchMirror,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            questions,
            answers,
            search,
            clock,
        }
    }
}

impl<Q, A> AnswerService<Q, A>
where
    Q: QuestionRepository,
    A: AnswerRepository,
{
    async fn existing(&self, id: &AnswerId) -> Result<Answer, Error> {
        self.answers
            .find_by_id(id)
            .await
            .map_err(answer_store)?
            .ok_or_else(|| Error::not_found(ANSWER_NOT_FOUND))
    }
}

#[async_trait]
impl<Q, A> AnswerCommand for AnswerService<Q, A>
where
    Q: QuestionRepository,
    A: AnswerRepository,
{
    async fn answer(
        &self,
        caller: &Caller,
        question_id: &QuestionId,
        text: PostText,
    ) -> Result<Answer, Error> {
        self.questions
            .find_by_id(question_id)
            .await
            .map_err(question_store)?
            .ok_or_else(|| Error::not_found(QUESTION_NOT_FOUND))?;

        let now = self.clock.utc();
        let answer = Answer::new(caller.user_id, *question_id, text, now);
        let event = OutboxEvent::question_answered(*question_id, answer.id, now);
        self.answers
            .record(&answer, &event)
            .await
            .map_err(answer_store)?;
        info!(
            question_id = %question_id,
            answer_id = %answer.id,
            event_id = %event.id,
            "answer recorded; subscriber notification queued"
        );

        self.search.entity(SearchKind::Answer, &answer).await;
        Ok(answer)
    }

    async fn edit(&self, caller: &Caller, id: &AnswerId, text: PostText) -> Result<Answer, Error> {
        let current = self.existing(id).await?;
        if !authorize(caller, Some(&current.author_id), Role::Member).is_allowed() {
            return Err(Error::unauthorized(
                "You do not have required permission to update this answer",
            ));
        }
        let updated = self
            .answers
            .update_text(id, &text, self.clock.utc())
            .await
            .map_err(answer_store)?
            .ok_or_else(|| Error::not_found(ANSWER_NOT_FOUND))?;
        self.search.entity(SearchKind::Answer, &updated).await;
        Ok(updated)
    }

    async fn vote(&self, id: &AnswerId, direction: VoteDirection) -> Result<Answer, Error> {
        self.answers
            .record_vote(id, direction, self.clock.utc())
            .await
            .map_err(answer_store)?
            .ok_or_else(|| Error::not_found(ANSWER_NOT_FOUND))
    }
}

#[async_trait]
impl<Q, A> AnswerQuery for AnswerService<Q, A>
where
    Q: QuestionRepository,
    A: AnswerRepository,
{
    async fn list_answers(&self) -> Result<Vec<Answer>, Error> {
        self.answers.list().await.map_err(answer_store)
    }

    async fn get_answer(&self, id: &AnswerId) -> Result<Answer, Error> {
        self.existing(id).await
    }

    async fn answers_for_question(&self, question_id: &QuestionId) -> Result<Vec<Answer>, Error> {
        self.answers
            .list_for_question(question_id)
            .await
            .map_err(answer_store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{
        AnswerPersistenceError, MockAnswerRepository, MockQuestionRepository, MockSearchIndex,
    };
    use crate::domain::{ErrorCode, QUESTION_ANSWERED_QUEUE, Question, UserId};
    use chrono::{DateTime, TimeZone, Utc};
    use mockable::MockClock;
    use mockall::predicate::eq;
    use rstest::rstest;

    type Service = AnswerService<MockQuestionRepository, MockAnswerRepository>;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 2, 9, 30, 0)
            .single()
            .expect("valid timestamp")
    }

    fn member(user_id: UserId) -> Caller {
        Caller {
            user_id,
            firstname: "Grace".into(),
            lastname: "Hopper".into(),
            email: "grace@example.net".into(),
            is_admin: false,
        }
    }

    fn service(questions: MockQuestionRepository, answers: MockAnswerRepository) -> Service {
        let mut clock = MockClock::new();
        clock.expect_utc().returning(fixed_now);
        let mut index = MockSearchIndex::new();
        index.expect_index().returning(|_, _| Ok(()));
        AnswerService::new(
            Arc::new(questions),
            Arc::new(answers),
            SearchMirror::new(Arc::new(index)),
            Arc::new(clock),
        )
    }

    fn question() -> Question {
        Question::new(
            UserId::random(),
            PostText::new("Q1").expect("text"),
            fixed_now(),
        )
    }

    #[tokio::test]
    async fn answering_records_answer_and_notification_together() {
        let target = question();
        let question_id = target.id;
        let author = UserId::random();

        let mut questions = MockQuestionRepository::new();
        questions
            .expect_find_by_id()
            .with(eq(question_id))
            .returning(move |_| Ok(Some(target.clone())));
        let mut answers = MockAnswerRepository::new();
        answers
            .expect_record()
            .withf(move |answer, event| {
                answer.question_id == question_id
                    && answer.author_id == author
                    && event.topic == QUESTION_ANSWERED_QUEUE
                    && event.payload["question"] == question_id.to_string()
                    && event.payload["answer"] == answer.id.to_string()
            })
            .times(1)
            .returning(|_, _| Ok(()));

        let answer = service(questions, answers)
            .answer(&member(author), &question_id, PostText::new("A1").expect("text"))
            .await
            .expect("answered");
        assert_eq!(answer.text.as_ref(), "A1");
        assert_eq!((answer.up_votes, answer.down_votes), (0, 0));
    }

    #[tokio::test]
    async fn answering_unknown_question_writes_nothing() {
        let mut questions = MockQuestionRepository::new();
        questions.expect_find_by_id().returning(|_| Ok(None));
        let mut answers = MockAnswerRepository::new();
        answers.expect_record().never();

        let err = service(questions, answers)
            .answer(
                &member(UserId::random()),
                &QuestionId::random(),
                PostText::new("orphan").expect("text"),
            )
            .await
            .expect_err("no question");
        assert_eq!(err.code(), ErrorCode::NotFound);
        assert_eq!(err.message(), "Question not found");
    }

    #[tokio::test]
    async fn question_deleted_mid_flight_is_not_found() {
        let target = question();
        let question_id = target.id;
        let mut questions = MockQuestionRepository::new();
        questions
            .expect_find_by_id()
            .returning(move |_| Ok(Some(target.clone())));
        let mut answers = MockAnswerRepository::new();
        answers
            .expect_record()
            .returning(move |_, _| Err(AnswerPersistenceError::question_missing(question_id.to_string())));

        let err = service(questions, answers)
            .answer(
                &member(UserId::random()),
                &question_id,
                PostText::new("late").expect("text"),
            )
            .await
            .expect_err("raced");
        assert_eq!(err.code(), ErrorCode::NotFound);
    }

    #[rstest]
    #[case(true, ErrorCode::Unauthorized)]
    #[case(false, ErrorCode::NotFound)]
    #[tokio::test]
    async fn edit_checks_existence_then_ownership(
        #[case] exists: bool,
        #[case] expected: ErrorCode,
    ) {
        let stored = Answer::new(
            UserId::random(),
            QuestionId::random(),
            PostText::new("mine").expect("text"),
            fixed_now(),
        );
        let id = stored.id;
        let mut answers = MockAnswerRepository::new();
        answers
            .expect_find_by_id()
            .returning(move |_| Ok(exists.then(|| stored.clone())));
        answers.expect_update_text().never();

        let err = service(MockQuestionRepository::new(), answers)
            .edit(
                &member(UserId::random()),
                &id,
                PostText::new("theirs").expect("text"),
            )
            .await
            .expect_err("rejected");
        assert_eq!(err.code(), expected);
    }

    #[tokio::test]
    async fn down_votes_increment_the_down_counter() {
        let stored = Answer::new(
            UserId::random(),
            QuestionId::random(),
            PostText::new("a").expect("text"),
            fixed_now(),
        );
        let id = stored.id;
        let mut answers = MockAnswerRepository::new();
        answers
            .expect_record_vote()
            .with(eq(id), eq(VoteDirection::Down), eq(fixed_now()))
            .returning(move |_, _, _| {
                let mut voted = stored.clone();
                voted.down_votes += 1;
                Ok(Some(voted))
            });

        let voted = service(MockQuestionRepository::new(), answers)
            .vote(&id, VoteDirection::Down)
            .await
            .expect("voted");
        assert_eq!((voted.up_votes, voted.down_votes), (0, 1));
    }

    #[tokio::test]
    async fn voting_on_missing_answer_is_not_found() {
        let mut answers = MockAnswerRepository::new();
        answers.expect_record_vote().returning(|_, _, _| Ok(None));

        let err = service(MockQuestionRepository::new(), answers)
            .vote(&AnswerId::random(), VoteDirection::Down)
            .await
            .expect_err("missing");
        assert_eq!(err.code(), ErrorCode::NotFound);
        assert_eq!(err.message(), ANSWER_NOT_FOUND);
    }
}

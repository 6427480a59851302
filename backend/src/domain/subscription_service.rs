//! Subscriptions to question activity.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;

use super::ports::{
    QuestionRepository, SubscriptionCommand, SubscriptionRepository, UserRepository,
};
use super::store_errors::{question_store, subscription_store, user_store};
use super::{Caller, Error, QuestionId, Role, Subscription, authorize};

/// Subscription service implementing [`SubscriptionCommand`].
#[derive(Clone)]
pub struct SubscriptionService<U, Q, S> {
    users: Arc<U>,
    questions: Arc<Q>,
    subscriptions: Arc<S>,
    clock: Arc<dyn Clock>,
}

impl<U, Q, S> SubscriptionService<U, Q, S> {
    pub fn new(
        users: Arc<U>,
        questions: Arc<Q>,
        subscriptions: Arc<S>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            users,
            questions,
            subscriptions,
            clock,
        }
    }
}

#[async_trait]
impl<U, Q, S> SubscriptionCommand for SubscriptionService<U, Q, S>
where
    U: UserRepository,
    Q: QuestionRepository,
    S: SubscriptionRepository,
{
    async fn subscribe(
        &self,
        caller: &Caller,
        question_id: &QuestionId,
    ) -> Result<Subscription, Error> {
        // Tokens outlive accounts, so the caller's user row is re-checked.
        self.users
            .find_by_id(&caller.user_id)
            .await
            .map_err(user_store)?
            .ok_or_else(|| Error::not_found("User does not exist"))?;
        self.questions
            .find_by_id(question_id)
            .await
            .map_err(question_store)?
            .ok_or_else(|| Error::not_found("Question not found"))?;

        let subscription = Subscription::new(caller.user_id, *question_id, self.clock.utc());
        self.subscriptions
            .subscribe(&subscription)
            .await
            .map_err(subscription_store)
    }

    async fn subscribers(
        &self,
        caller: &Caller,
        question_id: &QuestionId,
    ) -> Result<Vec<Subscription>, Error> {
        if !authorize(caller, None, Role::Admin).is_allowed() {
            return Err(Error::unauthorized("Access Denied"));
        }
        self.subscriptions
            .list_for_question(question_id)
            .await
            .map_err(subscription_store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{
        MockQuestionRepository, MockSubscriptionRepository, MockUserRepository,
    };
    use crate::domain::{
        EmailAddress, ErrorCode, PasswordDigest, PersonName, PostText, Question, User, UserId,
    };
    use chrono::Utc;
    use mockable::DefaultClock;
    use rstest::rstest;

    type Service =
        SubscriptionService<MockUserRepository, MockQuestionRepository, MockSubscriptionRepository>;

    fn caller(user_id: UserId, is_admin: bool) -> Caller {
        Caller {
            user_id,
            firstname: "Ada".into(),
            lastname: "Lovelace".into(),
            email: "ada@example.com".into(),
            is_admin,
        }
    }

    fn user(id: UserId) -> User {
        let now = Utc::now();
        User {
            id,
            firstname: PersonName::firstname("Ada").expect("name"),
            lastname: PersonName::lastname("Lovelace").expect("name"),
            email: EmailAddress::new("ada@example.com").expect("email"),
            password: PasswordDigest::new("$argon2id$stub"),
            is_admin: false,
            created_at: now,
            updated_at: now,
        }
    }

    fn service(
        users: MockUserRepository,
        questions: MockQuestionRepository,
        subscriptions: MockSubscriptionRepository,
    ) -> Service {
        SubscriptionService::new(
            Arc::new(users),
            Arc::new(questions),
            Arc::new(subscriptions),
            Arc::new(DefaultClock),
        )
    }

    #[tokio::test]
    async fn subscribe_uses_caller_identity() {
        let user_id = UserId::random();
        let question = Question::new(
            UserId::random(),
            PostText::new("Q").expect("text"),
            Utc::now(),
        );
        let question_id = question.id;

        let mut users = MockUserRepository::new();
        users
            .expect_find_by_id()
            .returning(move |id| Ok(Some(user(*id))));
        let mut questions = MockQuestionRepository::new();
        questions
            .expect_find_by_id()
            .returning(move |_| Ok(Some(question.clone())));
        let mut subscriptions = MockSubscriptionRepository::new();
        subscriptions
            .expect_subscribe()
            .withf(move |s| s.user_id == user_id && s.question_id == question_id)
            .times(1)
            .returning(|s| Ok(s.clone()));

        let subscription = service(users, questions, subscriptions)
            .subscribe(&caller(user_id, false), &question_id)
            .await
            .expect("subscribed");
        assert_eq!(subscription.user_id, user_id);
    }

    #[rstest]
    #[case(false, true, "User does not exist")]
    #[case(true, false, "Question not found")]
    #[tokio::test]
    async fn subscribe_requires_existing_user_and_question(
        #[case] user_exists: bool,
        #[case] question_exists: bool,
        #[case] message: &str,
    ) {
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_id()
            .returning(move |id| Ok(user_exists.then(|| user(*id))));
        let mut questions = MockQuestionRepository::new();
        questions.expect_find_by_id().returning(move |_| {
            Ok(question_exists.then(|| {
                Question::new(UserId::random(), PostText::new("Q").expect("text"), Utc::now())
            }))
        });
        let mut subscriptions = MockSubscriptionRepository::new();
        subscriptions.expect_subscribe().never();

        let err = service(users, questions, subscriptions)
            .subscribe(&caller(UserId::random(), false), &QuestionId::random())
            .await
            .expect_err("rejected");
        assert_eq!(err.code(), ErrorCode::NotFound);
        assert_eq!(err.message(), message);
    }

    #[tokio::test]
    async fn listing_subscribers_is_admin_only() {
        let mut subscriptions = MockSubscriptionRepository::new();
        subscriptions.expect_list_for_question().never();

        let err = service(
            MockUserRepository::new(),
            MockQuestionRepository::new(),
            subscriptions,
        )
        .subscribers(&caller(UserId::random(), false), &QuestionId::random())
        .await
        .expect_err("denied");
        assert_eq!(err.code(), ErrorCode::Unauthorized);
        assert_eq!(err.message(), "Access Denied");
    }

    #[tokio::test]
    async fn admins_see_subscribers() {
        let question_id = QuestionId::random();
        let mut subscriptions = MockSubscriptionRepository::new();
        subscriptions
            .expect_list_for_question()
            .returning(move |q| Ok(vec![Subscription::new(UserId::random(), *q, Utc::now())]));

        let listed = service(
            MockUserRepository::new(),
            MockQuestionRepository::new(),
            subscriptions,
        )
        .subscribers(&caller(UserId::random(), true), &question_id)
        .await
        .expect("listed");
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].question_id, question_id);
    }
}

//! Behaviour of the in-memory store.

use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use rstest::{fixture, rstest};

use super::InMemoryStore;
use crate::domain::ports::{
    AnswerPersistenceError, AnswerRepository, NotificationOutbox, QuestionRepository,
    SubscriptionRepository, UserPersistenceError, UserRepository,
};
use crate::domain::{
    Answer, DeliveryFailure, EmailAddress, OutboxEvent, PasswordDigest, PersonName, PostText,
    Question, QuestionId, Subscription, User, UserId, VoteDirection,
};

#[fixture]
fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0)
        .single()
        .expect("valid time")
}

fn user(email: &str, now: DateTime<Utc>) -> User {
    User {
        id: UserId::random(),
        firstname: PersonName::firstname("Grace").expect("name"),
        lastname: PersonName::lastname("Hopper").expect("name"),
        email: EmailAddress::new(email).expect("email"),
        password: PasswordDigest::new("digest"),
        is_admin: false,
        created_at: now,
        updated_at: now,
    }
}

fn text(raw: &str) -> PostText {
    PostText::new(raw).expect("text")
}

async fn seeded_question(store: &InMemoryStore, now: DateTime<Utc>) -> Question {
    let question = Question::new(UserId::random(), text("How do lifetimes work?"), now);
    QuestionRepository::insert(store, &question)
        .await
        .expect("insert question");
    question
}

#[rstest]
#[tokio::test]
async fn duplicate_emails_are_rejected_on_insert_and_update(now: DateTime<Utc>) {
    let store = InMemoryStore::new();
    let grace = user("grace@navy.com", now);
    let ada = user("ada@engine.net", now);
    UserRepository::insert(&store, &grace).await.expect("grace");
    UserRepository::insert(&store, &ada).await.expect("ada");

    let err = UserRepository::insert(&store, &user("grace@navy.com", now))
        .await
        .expect_err("duplicate");
    assert_eq!(err, UserPersistenceError::duplicate_email());

    let renamed = User {
        email: grace.email.clone(),
        ..ada.clone()
    };
    let err = UserRepository::update(&store, &renamed)
        .await
        .expect_err("taken");
    assert_eq!(err, UserPersistenceError::duplicate_email());
}

#[rstest]
#[tokio::test]
async fn updating_an_unknown_user_is_missing(now: DateTime<Utc>) {
    let store = InMemoryStore::new();
    let err = UserRepository::update(&store, &user("nobody@example.com", now))
        .await
        .expect_err("missing");
    assert_eq!(err, UserPersistenceError::missing());
}

#[rstest]
#[tokio::test]
async fn votes_and_views_only_grow(now: DateTime<Utc>) {
    let store = InMemoryStore::new();
    let question = seeded_question(&store, now).await;
    let later = now + TimeDelta::minutes(5);

    QuestionRepository::record_vote(&store, &question.id, VoteDirection::Up, later)
        .await
        .expect("up");
    QuestionRepository::record_vote(&store, &question.id, VoteDirection::Down, later)
        .await
        .expect("down");
    let viewed = store
        .record_view(&question.id)
        .await
        .expect("view")
        .expect("exists");

    assert_eq!((viewed.up_votes, viewed.down_votes, viewed.views), (1, 1, 1));
    assert_eq!(viewed.updated_at, later);
    assert!(
        store
            .record_view(&QuestionId::random())
            .await
            .expect("lookup")
            .is_none()
    );
}

#[rstest]
#[tokio::test]
async fn recording_an_answer_links_it_and_enqueues_one_event(now: DateTime<Utc>) {
    let store = InMemoryStore::new();
    let question = seeded_question(&store, now).await;
    let answer = Answer::new(UserId::random(), question.id, text("Like borrows."), now);
    let event = OutboxEvent::question_answered(question.id, answer.id, now);

    store.record(&answer, &event).await.expect("recorded");

    let stored = QuestionRepository::find_by_id(&store, &question.id)
        .await
        .expect("lookup")
        .expect("exists");
    assert_eq!(stored.answer_ids, vec![answer.id]);
    let due = store.due(now, 10).await.expect("due");
    assert_eq!(due, vec![event]);
}

#[rstest]
#[tokio::test]
async fn answers_to_missing_questions_write_nothing(now: DateTime<Utc>) {
    let store = InMemoryStore::new();
    let missing = QuestionId::random();
    let answer = Answer::new(UserId::random(), missing, text("Orphan"), now);
    let event = OutboxEvent::question_answered(missing, answer.id, now);

    let err = store.record(&answer, &event).await.expect_err("no question");

    assert_eq!(
        err,
        AnswerPersistenceError::question_missing(missing.to_string())
    );
    assert!(AnswerRepository::list(&store).await.expect("list").is_empty());
    assert!(store.due(now, 10).await.expect("due").is_empty());
}

#[rstest]
#[tokio::test]
async fn subscribing_twice_returns_the_first_subscription(now: DateTime<Utc>) {
    let store = InMemoryStore::new();
    let (reader, question) = (UserId::random(), QuestionId::random());
    let first = store
        .subscribe(&Subscription::new(reader, question, now))
        .await
        .expect("first");
    let second = store
        .subscribe(&Subscription::new(reader, question, now + TimeDelta::seconds(1)))
        .await
        .expect("second");

    assert_eq!(first, second);
    assert_eq!(
        SubscriptionRepository::list_for_question(&store, &question)
            .await
            .expect("list")
            .len(),
        1
    );
}

#[rstest]
#[tokio::test]
async fn failed_events_wait_for_their_retry_and_parked_events_stop(now: DateTime<Utc>) {
    let store = InMemoryStore::new();
    let question = seeded_question(&store, now).await;
    let answer = Answer::new(UserId::random(), question.id, text("Retry me"), now);
    let event = OutboxEvent::question_answered(question.id, answer.id, now);
    store.record(&answer, &event).await.expect("recorded");

    let retry_at = now + TimeDelta::seconds(30);
    store
        .record_failure(
            &event.id,
            &DeliveryFailure {
                attempts: 1,
                error: "broker down".into(),
                retry_at: Some(retry_at),
            },
            now,
        )
        .await
        .expect("rescheduled");
    assert!(store.due(now, 10).await.expect("due").is_empty());
    let retried = store.due(retry_at, 10).await.expect("due");
    assert_eq!(retried[0].attempts, 1);

    store
        .record_failure(
            &event.id,
            &DeliveryFailure {
                attempts: 2,
                error: "broker down".into(),
                retry_at: None,
            },
            retry_at,
        )
        .await
        .expect("parked");
    assert!(
        store
            .due(retry_at + TimeDelta::days(1), 10)
            .await
            .expect("due")
            .is_empty()
    );
}

//! Test utilities for the backend crate.
//!
//! [`ForumHarness`] assembles the real services over in-memory adapters so
//! integration tests in `tests/` can drive the full HTTP surface without
//! PostgreSQL, RabbitMQ, or Meilisearch. It is only compiled for tests or
//! with the `test-support` feature.

use std::sync::{Arc, Mutex, PoisonError};

use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, web};
use async_trait::async_trait;
use chrono::TimeDelta;
use mockable::{Clock, DefaultClock};
use serde_json::Value;
use url::Url;

use crate::Trace;
use crate::domain::ports::{MessageQueue, MessageQueueError};
use crate::domain::{
    AnswerService, DispatcherConfig, NotificationDispatcher, PasswordResetMailer,
    QuestionService, SearchMirror, SearchService, SubscriptionService, UserService,
};
use crate::inbound::http::auth::TokenGate;
use crate::inbound::http::configure;
use crate::inbound::http::health::health_check;
use crate::inbound::http::state::{HttpState, HttpStatePorts};
use crate::outbound::hashing::Argon2CredentialHasher;
use crate::outbound::memory::InMemoryStore;
use crate::outbound::search::InMemorySearchIndex;
use crate::outbound::token::HmacTokenService;

const TEST_SECRET: &str = "forum-test-secret";
const APP_URL: &str = "http://forum.test";

/// Message queue that keeps every published message for inspection.
#[derive(Debug, Clone, Default)]
pub struct RecordingQueue {
    messages: Arc<Mutex<Vec<(String, Value)>>>,
}

impl RecordingQueue {
    /// Messages published so far, as `(queue, payload)` pairs.
    pub fn messages(&self) -> Vec<(String, Value)> {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl MessageQueue for RecordingQueue {
    async fn publish(&self, queue: &str, payload: &Value) -> Result<(), MessageQueueError> {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((queue.to_owned(), payload.clone()));
        Ok(())
    }
}

/// Services wired over shared in-memory adapters.
///
/// # Examples
/// ```
/// use actix_web::test as actix_test;
/// use qanda::test_support::ForumHarness;
///
/// # actix_web::rt::System::new().block_on(async {
/// let harness = ForumHarness::new();
/// let app = actix_test::init_service(harness.app()).await;
/// let request = actix_test::TestRequest::get().uri("/api/v1/questions").to_request();
/// let response = actix_test::call_service(&app, request).await;
/// assert!(response.status().is_success());
/// # });
/// ```
pub struct ForumHarness {
    pub store: InMemoryStore,
    pub search: InMemorySearchIndex,
    pub queue: RecordingQueue,
    state: web::Data<HttpState>,
    clock: Arc<dyn Clock>,
}

impl Default for ForumHarness {
    fn default() -> Self {
        Self::new()
    }
}

impl ForumHarness {
    pub fn new() -> Self {
        let store = InMemoryStore::new();
        let search = InMemorySearchIndex::new();
        let queue = RecordingQueue::default();
        let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
        let shared = Arc::new(store.clone());
        let mirror = SearchMirror::new(Arc::new(search.clone()));
        let tokens = Arc::new(HmacTokenService::new(TEST_SECRET, TimeDelta::hours(1)));
        // Cheap parameters; production defaults make each request slow.
        let hasher = Argon2CredentialHasher::with_params(8, 1, 1)
            .unwrap_or_else(|_| Argon2CredentialHasher::new());
        let app_url = Url::parse(APP_URL).expect("harness URL parses");
        let mailer = PasswordResetMailer::new(Arc::new(queue.clone()), &app_url)
            .expect("harness URL can anchor reset links");

        let users = Arc::new(UserService::new(
            Arc::clone(&shared),
            Arc::new(hasher),
            tokens.clone(),
            mailer,
            mirror.clone(),
            Arc::clone(&clock),
        ));
        let questions = Arc::new(QuestionService::new(
            Arc::clone(&shared),
            mirror.clone(),
            Arc::clone(&clock),
        ));
        let answers = Arc::new(AnswerService::new(
            Arc::clone(&shared),
            Arc::clone(&shared),
            mirror,
            Arc::clone(&clock),
        ));
        let subscriptions = Arc::new(SubscriptionService::new(
            Arc::clone(&shared),
            Arc::clone(&shared),
            shared,
            Arc::clone(&clock),
        ));
        let ports = HttpStatePorts {
            users: users.clone(),
            users_query: users,
            questions: questions.clone(),
            questions_query: questions,
            answers: answers.clone(),
            answers_query: answers,
            subscriptions,
            search: Arc::new(SearchService::new(Arc::new(search.clone()))),
        };
        let gate = TokenGate::new(tokens, Arc::clone(&clock));

        Self {
            store,
            search,
            queue,
            state: web::Data::new(HttpState::new(ports, gate)),
            clock,
        }
    }

    /// App mounting the `/api/v1` routes and the health check.
    pub fn app(
        &self,
    ) -> App<
        impl ServiceFactory<
            ServiceRequest,
            Config = (),
            Response = ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        > + use<>,
    > {
        App::new()
            .app_data(self.state.clone())
            .wrap(Trace)
            .service(
                web::scope("/api/v1")
                    .service(health_check)
                    .configure(configure),
            )
    }

    /// Dispatcher draining the harness outbox into [`Self::queue`].
    pub fn dispatcher(&self) -> NotificationDispatcher {
        NotificationDispatcher::new(
            Arc::new(self.store.clone()),
            Arc::new(self.queue.clone()),
            Arc::clone(&self.clock),
            DispatcherConfig::default(),
        )
    }
}

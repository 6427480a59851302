//! Builders wiring repositories and adapters into the HTTP state and the
//! notification dispatcher.

use std::io;
use std::sync::Arc;

use actix_web::web;
use mockable::{Clock, DefaultClock};

use qanda::domain::ports::{
    AnswerRepository, NotificationOutbox, QuestionRepository, SubscriptionRepository,
    UserRepository,
};
use qanda::domain::{
    AnswerService, NotificationDispatcher, PasswordResetMailer, QuestionService, SearchMirror,
    SearchService, SubscriptionService, UserService,
};
use qanda::inbound::http::auth::TokenGate;
use qanda::inbound::http::state::{HttpState, HttpStatePorts};
use qanda::outbound::hashing::Argon2CredentialHasher;
use qanda::outbound::memory::InMemoryStore;
use qanda::outbound::persistence::{
    DieselAnswerRepository, DieselNotificationOutbox, DieselQuestionRepository,
    DieselSubscriptionRepository, DieselUserRepository,
};

use super::ServerConfig;

/// HTTP state plus the dispatcher draining the same outbox.
pub(crate) struct ForumState {
    pub(crate) http_state: web::Data<HttpState>,
    pub(crate) dispatcher: NotificationDispatcher,
}

/// One adapter per repository port.
struct Repositories<U, Q, A, S> {
    users: Arc<U>,
    questions: Arc<Q>,
    answers: Arc<A>,
    subscriptions: Arc<S>,
    outbox: Arc<dyn NotificationOutbox>,
}

impl Repositories<InMemoryStore, InMemoryStore, InMemoryStore, InMemoryStore> {
    fn in_memory() -> Self {
        let store = Arc::new(InMemoryStore::new());
        Self {
            users: Arc::clone(&store),
            questions: Arc::clone(&store),
            answers: Arc::clone(&store),
            subscriptions: Arc::clone(&store),
            outbox: store,
        }
    }
}

fn build_ports<U, Q, A, S>(
    repos: Repositories<U, Q, A, S>,
    config: &ServerConfig,
    clock: &Arc<dyn Clock>,
) -> io::Result<HttpStatePorts>
where
    U: UserRepository + 'static,
    Q: QuestionRepository + 'static,
    A: AnswerRepository + 'static,
    S: SubscriptionRepository + 'static,
{
    let Repositories {
        users,
        questions,
        answers,
        subscriptions,
        outbox: _,
    } = repos;
    let mirror = SearchMirror::new(Arc::clone(&config.search_index));
    let mailer = PasswordResetMailer::new(Arc::clone(&config.queue), &config.app_url)
        .map_err(|err| io::Error::other(format!("invalid app url: {err}")))?;

    let user_service = Arc::new(UserService::new(
        Arc::clone(&users),
        Arc::new(Argon2CredentialHasher::new()),
        Arc::clone(&config.tokens),
        mailer,
        mirror.clone(),
        Arc::clone(clock),
    ));
    let question_service = Arc::new(QuestionService::new(
        Arc::clone(&questions),
        mirror.clone(),
        Arc::clone(clock),
    ));
    let answer_service = Arc::new(AnswerService::new(
        Arc::clone(&questions),
        answers,
        mirror,
        Arc::clone(clock),
    ));
    let subscription_service = Arc::new(SubscriptionService::new(
        users,
        questions,
        subscriptions,
        Arc::clone(clock),
    ));

    Ok(HttpStatePorts {
        users: user_service.clone(),
        users_query: user_service,
        questions: question_service.clone(),
        questions_query: question_service,
        answers: answer_service.clone(),
        answers_query: answer_service,
        subscriptions: subscription_service,
        search: Arc::new(SearchService::new(Arc::clone(&config.search_index))),
    })
}

/// Build the HTTP state and dispatcher from configuration.
///
/// Uses the Diesel repositories when a pool is available, otherwise a single
/// shared [`InMemoryStore`].
///
/// # Errors
/// Returns [`std::io::Error`] when the configured application URL cannot
/// anchor the password reset link.
pub(crate) fn build_forum_state(config: &ServerConfig) -> io::Result<ForumState> {
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let (ports, outbox) = match &config.db_pool {
        Some(pool) => {
            let repos = Repositories {
                users: Arc::new(DieselUserRepository::new(pool.clone())),
                questions: Arc::new(DieselQuestionRepository::new(pool.clone())),
                answers: Arc::new(DieselAnswerRepository::new(pool.clone())),
                subscriptions: Arc::new(DieselSubscriptionRepository::new(pool.clone())),
                outbox: Arc::new(DieselNotificationOutbox::new(pool.clone())),
            };
            let outbox = Arc::clone(&repos.outbox);
            (build_ports(repos, config, &clock)?, outbox)
        }
        None => {
            let repos = Repositories::in_memory();
            let outbox = Arc::clone(&repos.outbox);
            (build_ports(repos, config, &clock)?, outbox)
        }
    };

    let gate = TokenGate::new(Arc::clone(&config.tokens), Arc::clone(&clock));
    let dispatcher = NotificationDispatcher::new(
        outbox,
        Arc::clone(&config.queue),
        clock,
        config.dispatcher.clone(),
    );
    Ok(ForumState {
        http_state: web::Data::new(HttpState::new(ports, gate)),
        dispatcher,
    })
}

//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_web::{App, web};
use mockable::DefaultClock;

use crate::domain::ports::{
    MockAnswerCommand, MockAnswerQuery, MockQuestionCommand, MockQuestionQuery, MockSearchQuery,
    MockSubscriptionCommand, MockTokenService, MockUserCommand, MockUserQuery,
};
use crate::domain::{Caller, UserId};

use super::auth::TokenGate;
use super::state::{HttpState, HttpStatePorts};

/// Token value accepted by [`TestPorts::signed_in`].
pub const TEST_TOKEN: &str = "test-token";

/// Mocked ports; tests set expectations on the fields they exercise.
#[derive(Default)]
pub struct TestPorts {
    pub users: MockUserCommand,
    pub users_query: MockUserQuery,
    pub questions: MockQuestionCommand,
    pub questions_query: MockQuestionQuery,
    pub answers: MockAnswerCommand,
    pub answers_query: MockAnswerQuery,
    pub subscriptions: MockSubscriptionCommand,
    pub search: MockSearchQuery,
    pub tokens: MockTokenService,
}

impl TestPorts {
    /// Ports whose token service accepts [`TEST_TOKEN`] as `caller`.
    pub fn signed_in(caller: Caller) -> Self {
        let mut tokens = MockTokenService::new();
        tokens
            .expect_verify()
            .withf(|raw, _| raw.trim() == TEST_TOKEN)
            .returning(move |_, _| Ok(caller.clone()));
        Self {
            tokens,
            ..Self::default()
        }
    }

    pub fn into_state(self) -> HttpState {
        let ports = HttpStatePorts {
            users: Arc::new(self.users),
            users_query: Arc::new(self.users_query),
            questions: Arc::new(self.questions),
            questions_query: Arc::new(self.questions_query),
            answers: Arc::new(self.answers),
            answers_query: Arc::new(self.answers_query),
            subscriptions: Arc::new(self.subscriptions),
            search: Arc::new(self.search),
        };
        HttpState::new(
            ports,
            TokenGate::new(Arc::new(self.tokens), Arc::new(DefaultClock)),
        )
    }

    /// App mounting every `/api/v1` route over these ports.
    pub fn into_app(
        self,
    ) -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        App::new()
            .app_data(web::Data::new(self.into_state()))
            .service(web::scope("/api/v1").configure(super::configure))
    }
}

pub fn member() -> Caller {
    Caller {
        user_id: UserId::random(),
        firstname: "Grace".into(),
        lastname: "Hopper".into(),
        email: "grace@navy.com".into(),
        is_admin: false,
    }
}

pub fn admin() -> Caller {
    Caller {
        is_admin: true,
        ..member()
    }
}

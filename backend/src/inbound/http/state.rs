//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    AnswerCommand, AnswerQuery, QuestionCommand, QuestionQuery, SearchQuery, SubscriptionCommand,
    UserCommand, UserQuery,
};

use super::auth::TokenGate;

/// Parameter object bundling the driving ports used by HTTP handlers.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub users: Arc<dyn UserCommand>,
    pub users_query: Arc<dyn UserQuery>,
    pub questions: Arc<dyn QuestionCommand>,
    pub questions_query: Arc<dyn QuestionQuery>,
    pub answers: Arc<dyn AnswerCommand>,
    pub answers_query: Arc<dyn AnswerQuery>,
    pub subscriptions: Arc<dyn SubscriptionCommand>,
    pub search: Arc<dyn SearchQuery>,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub users: Arc<dyn UserCommand>,
    pub users_query: Arc<dyn UserQuery>,
    pub questions: Arc<dyn QuestionCommand>,
    pub questions_query: Arc<dyn QuestionQuery>,
    pub answers: Arc<dyn AnswerCommand>,
    pub answers_query: Arc<dyn AnswerQuery>,
    pub subscriptions: Arc<dyn SubscriptionCommand>,
    pub search: Arc<dyn SearchQuery>,
    /// Verifies `x-auth-token` headers for [`super::auth::AuthenticatedCaller`].
    pub gate: TokenGate,
}

impl HttpState {
    /// Construct state from the driving ports and the token gate.
    ///
    /// # Examples
    /// ```no_run
    /// use std::sync::Arc;
    ///
    /// use chrono::TimeDelta;
    /// use mockable::DefaultClock;
    /// use qanda::inbound::http::auth::TokenGate;
    /// use qanda::inbound::http::state::{HttpState, HttpStatePorts};
    /// use qanda::outbound::token::HmacTokenService;
    ///
    /// fn build(ports: HttpStatePorts) -> HttpState {
    ///     let tokens = Arc::new(HmacTokenService::new("secret", TimeDelta::hours(24)));
    ///     HttpState::new(ports, TokenGate::new(tokens, Arc::new(DefaultClock)))
    /// }
    /// ```
    pub fn new(ports: HttpStatePorts, gate: TokenGate) -> Self {
        let HttpStatePorts {
            users,
            users_query,
            questions,
            questions_query,
            answers,
            answers_query,
            subscriptions,
            search,
        } = ports;
        Self {
            users,
            users_query,
            questions,
            questions_query,
            answers,
            answers_query,
            subscriptions,
            search,
            gate,
        }
    }
}

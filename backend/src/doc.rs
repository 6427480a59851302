//! OpenAPI documentation configuration.
//!
//! This module defines the [`ApiDoc`] struct which generates the OpenAPI
//! specification for the REST API. It registers:
//!
//! - **Paths**: every HTTP endpoint from the inbound layer
//! - **Schemas**: domain type wrappers ([`ErrorSchema`], [`UserSchema`],
//!   [`QuestionSchema`], and friends) that keep utoipa out of the domain
//! - **Security**: the `x-auth-token` header scheme
//!
//! The generated specification is used by Swagger UI (debug builds) and
//! exported via `cargo run --bin openapi-dump` for external tooling.

use crate::inbound::http::answers::{AnswerPayload, CreateAnswerPayload};
use crate::inbound::http::questions::QuestionPayload;
use crate::inbound::http::schemas::{
    AnswerSchema, ErrorCodeSchema, ErrorSchema, QuestionSchema, SubscriptionSchema, UserSchema,
};
use crate::inbound::http::subscriptions::SubscribePayload;
use crate::inbound::http::users::{
    ChangePasswordRequest, ForgotPasswordRequest, LoginRequest, LoginResponse, RegisterRequest,
    ResetPasswordBody, UpdateUserBody,
};
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Name of the header-token security scheme.
pub const AUTH_SCHEME: &str = "AuthToken";

/// Enrich the generated document with the token header security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            AUTH_SCHEME,
            SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::with_description(
                "x-auth-token",
                "Token returned in the x-auth-token header by POST /api/v1/users/login.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
/// Swagger UI is enabled in debug builds only and used by tooling.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Q&A forum API",
        description = "Users ask questions, answer them, vote, subscribe, and search."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("AuthToken" = [])),
    paths(
        crate::inbound::http::users::register,
        crate::inbound::http::users::login,
        crate::inbound::http::users::forgot_password,
        crate::inbound::http::users::reset_password,
        crate::inbound::http::users::list_users,
        crate::inbound::http::users::get_user,
        crate::inbound::http::users::update_user,
        crate::inbound::http::users::change_password,
        crate::inbound::http::questions::create_question,
        crate::inbound::http::questions::list_questions,
        crate::inbound::http::questions::get_question,
        crate::inbound::http::questions::update_question,
        crate::inbound::http::questions::vote_question,
        crate::inbound::http::answers::create_answer,
        crate::inbound::http::answers::list_answers,
        crate::inbound::http::answers::get_answer,
        crate::inbound::http::answers::answers_for_question,
        crate::inbound::http::answers::update_answer,
        crate::inbound::http::answers::vote_answer,
        crate::inbound::http::subscriptions::subscribe,
        crate::inbound::http::subscriptions::list_subscribers,
        crate::inbound::http::search::search_users,
        crate::inbound::http::search::search_questions,
        crate::inbound::http::search::search_answers,
        crate::inbound::http::health::health_check,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        ErrorSchema,
        ErrorCodeSchema,
        UserSchema,
        QuestionSchema,
        AnswerSchema,
        SubscriptionSchema,
        RegisterRequest,
        LoginRequest,
        LoginResponse,
        ForgotPasswordRequest,
        ResetPasswordBody,
        ChangePasswordRequest,
        UpdateUserBody,
        QuestionPayload,
        CreateAnswerPayload,
        AnswerPayload,
        SubscribePayload,
    )),
    tags(
        (name = "users", description = "Registration, login, and profiles"),
        (name = "questions", description = "Asking, editing, and voting on questions"),
        (name = "answers", description = "Answering, editing, and voting on answers"),
        (name = "subscriptions", description = "Following questions"),
        (name = "search", description = "Free-text search"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;

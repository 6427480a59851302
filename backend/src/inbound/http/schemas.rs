//! OpenAPI schema definitions for domain types.
//!
//! Domain types remain framework-agnostic by not deriving `ToSchema`. This
//! module provides the schema definitions required for OpenAPI documentation
//! using utoipa's external schema registration.
//!
//! Success responses wrap these schemas in `{message, body}`; error responses
//! use [`ErrorSchema`] directly.

use utoipa::ToSchema;

/// OpenAPI schema for [`crate::domain::ErrorCode`].
#[derive(ToSchema)]
#[schema(as = crate::domain::ErrorCode)]
pub enum ErrorCodeSchema {
    /// The request is malformed, fails validation, or breaks a business rule.
    #[schema(rename = "invalid_request")]
    InvalidRequest,
    /// Not signed in, or not permitted to perform this action.
    #[schema(rename = "unauthorized")]
    Unauthorized,
    /// The requested resource does not exist.
    #[schema(rename = "not_found")]
    NotFound,
    /// The database or search engine could not be reached.
    #[schema(rename = "service_unavailable")]
    ServiceUnavailable,
    /// An unexpected error occurred on the server.
    #[schema(rename = "internal_error")]
    InternalError,
}

/// OpenAPI schema for error responses built from [`crate::domain::Error`].
#[derive(ToSchema)]
#[schema(as = crate::domain::Error, rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct ErrorSchema {
    /// Human-readable message returned to clients.
    #[schema(example = "Question not found")]
    message: String,
    /// Always an empty object on errors.
    #[schema(value_type = Object)]
    body: serde_json::Value,
    /// Stable machine-readable error code.
    #[schema(example = "not_found")]
    code: ErrorCodeSchema,
    /// Correlation identifier, echoed in the `trace-id` header.
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    trace_id: Option<String>,
    /// Offending field and a machine-readable reason, for validation errors.
    details: Option<serde_json::Value>,
}

/// OpenAPI schema for [`crate::domain::User`]. The password hash is never
/// serialised.
#[derive(ToSchema)]
#[schema(as = crate::domain::User, rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct UserSchema {
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    id: String,
    #[schema(example = "Ada")]
    firstname: String,
    #[schema(example = "Lovelace")]
    lastname: String,
    #[schema(example = "ada@engine.net")]
    email: String,
    is_admin: bool,
    #[schema(format = DateTime)]
    created_at: String,
    #[schema(format = DateTime)]
    updated_at: String,
}

/// OpenAPI schema for [`crate::domain::Question`].
#[derive(ToSchema)]
#[schema(as = crate::domain::Question, rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct QuestionSchema {
    id: String,
    #[schema(example = "How do lifetimes work?")]
    text: String,
    author_id: String,
    views: u64,
    up_votes: u64,
    down_votes: u64,
    /// Answers in the order they were recorded, each at most once.
    answer_ids: Vec<String>,
    #[schema(format = DateTime)]
    created_at: String,
    #[schema(format = DateTime)]
    updated_at: String,
}

/// OpenAPI schema for [`crate::domain::Answer`].
#[derive(ToSchema)]
#[schema(as = crate::domain::Answer, rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct AnswerSchema {
    id: String,
    #[schema(example = "Like borrows with names.")]
    text: String,
    author_id: String,
    question_id: String,
    up_votes: u64,
    down_votes: u64,
    #[schema(format = DateTime)]
    created_at: String,
    #[schema(format = DateTime)]
    updated_at: String,
}

/// OpenAPI schema for [`crate::domain::Subscription`].
#[derive(ToSchema)]
#[schema(as = crate::domain::Subscription, rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct SubscriptionSchema {
    id: String,
    user_id: String,
    question_id: String,
    #[schema(format = DateTime)]
    created_at: String,
}

//! Questions API handlers.
//!
//! ```text
//! POST /api/v1/questions {"question":"How do lifetimes work?"}
//! PUT  /api/v1/questions/{id}/vote?up=0
//! ```

use actix_web::{HttpResponse, get, post, put, web};
use serde::{Deserialize, Serialize};

use crate::domain::QuestionId;
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::AuthenticatedCaller;
use crate::inbound::http::envelope;
use crate::inbound::http::schemas::{ErrorSchema, QuestionSchema};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, parse_path_id, parse_post_text, parse_vote_flag,
};

const QUESTION: FieldName = FieldName::new("question");

/// Create and edit body. The text travels under the `question` key.
#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(default)]
pub struct QuestionPayload {
    pub question: String,
}

/// `?up=` flag shared by both vote endpoints. Absent means up.
#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[serde(default)]
#[into_params(parameter_in = Query)]
pub struct VoteQuery {
    /// `1`/`true` up-votes, `0`/`false` down-votes.
    pub up: Option<String>,
}

/// Post a question as the caller.
#[utoipa::path(
    post,
    path = "/api/v1/questions",
    request_body = QuestionPayload,
    responses(
        (status = 201, description = "Question created successfully", body = QuestionSchema),
        (status = 400, description = "Blank question", body = ErrorSchema),
        (status = 401, description = "Not signed in", body = ErrorSchema)
    ),
    tags = ["questions"],
    operation_id = "createQuestion"
)]
#[post("/questions")]
pub async fn create_question(
    state: web::Data<HttpState>,
    caller: AuthenticatedCaller,
    payload: web::Json<QuestionPayload>,
) -> ApiResult<HttpResponse> {
    let text = parse_post_text(&payload.question, QUESTION)?;
    let question = state.questions.ask(caller.caller(), text).await?;
    Ok(envelope::created("Question created successfully", question))
}

#[utoipa::path(
    get,
    path = "/api/v1/questions",
    responses((status = 200, description = "All questions", body = [QuestionSchema])),
    tags = ["questions"],
    operation_id = "listQuestions",
    security([])
)]
#[get("/questions")]
pub async fn list_questions(state: web::Data<HttpState>) -> ApiResult<HttpResponse> {
    let questions = state.questions_query.list_questions().await?;
    Ok(envelope::ok("All questions", questions))
}

/// Fetch one question, counting the view.
#[utoipa::path(
    get,
    path = "/api/v1/questions/{id}",
    params(("id" = String, Path, description = "Question id")),
    responses(
        (status = 200, description = "Single question", body = QuestionSchema),
        (status = 404, description = "Question not found", body = ErrorSchema)
    ),
    tags = ["questions"],
    operation_id = "getQuestion",
    security([])
)]
#[get("/questions/{id}")]
pub async fn get_question(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id: QuestionId = parse_path_id(&path)?;
    let question = state.questions_query.view_question(&id).await?;
    Ok(envelope::ok("Single question", question))
}

/// Replace the question text. Author or admin only.
#[utoipa::path(
    put,
    path = "/api/v1/questions/{id}",
    params(("id" = String, Path, description = "Question id")),
    request_body = QuestionPayload,
    responses(
        (status = 200, description = "Question updated successfully", body = QuestionSchema),
        (status = 400, description = "Blank question", body = ErrorSchema),
        (status = 401, description = "Not signed in or not the author", body = ErrorSchema),
        (status = 404, description = "Question not found", body = ErrorSchema)
    ),
    tags = ["questions"],
    operation_id = "updateQuestion"
)]
#[put("/questions/{id}")]
pub async fn update_question(
    state: web::Data<HttpState>,
    caller: AuthenticatedCaller,
    path: web::Path<String>,
    payload: web::Json<QuestionPayload>,
) -> ApiResult<HttpResponse> {
    let id: QuestionId = parse_path_id(&path)?;
    let text = parse_post_text(&payload.question, QUESTION)?;
    let question = state.questions.edit(caller.caller(), &id, text).await?;
    Ok(envelope::ok("Question updated successfully", question))
}

#[utoipa::path(
    put,
    path = "/api/v1/questions/{id}/vote",
    params(("id" = String, Path, description = "Question id"), VoteQuery),
    responses(
        (status = 200, description = "Question up-voted or down-voted", body = QuestionSchema),
        (status = 400, description = "Unreadable up flag", body = ErrorSchema),
        (status = 401, description = "Not signed in", body = ErrorSchema),
        (status = 404, description = "Question not found", body = ErrorSchema)
    ),
    tags = ["questions"],
    operation_id = "voteQuestion"
)]
#[put("/questions/{id}/vote")]
pub async fn vote_question(
    state: web::Data<HttpState>,
    _caller: AuthenticatedCaller,
    path: web::Path<String>,
    query: web::Query<VoteQuery>,
) -> ApiResult<HttpResponse> {
    let id: QuestionId = parse_path_id(&path)?;
    let direction = parse_vote_flag(query.up.as_deref())?;
    let question = state.questions.vote(&id, direction).await?;
    Ok(envelope::ok(
        format!("Question {} successfully", direction.verb()),
        question,
    ))
}

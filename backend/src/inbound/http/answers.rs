//! Answers API handlers.
//!
//! ```text
//! POST /api/v1/answers {"answer":"Like borrows.","question":"<question id>"}
//! GET  /api/v1/answers/question/{id}
//! ```

use actix_web::{HttpResponse, get, post, put, web};
use serde::{Deserialize, Serialize};

use crate::domain::{AnswerId, QuestionId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::AuthenticatedCaller;
use crate::inbound::http::envelope;
use crate::inbound::http::questions::VoteQuery;
use crate::inbound::http::schemas::{AnswerSchema, ErrorSchema};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, parse_body_id, parse_path_id, parse_post_text, parse_vote_flag,
};

const ANSWER: FieldName = FieldName::new("answer");
const QUESTION: FieldName = FieldName::new("question");

/// Create body: the answer text and the question it answers.
#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(default)]
pub struct CreateAnswerPayload {
    pub answer: String,
    /// Id of the question being answered.
    pub question: Option<String>,
}

/// Edit body. The text travels under the `answer` key.
#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(default)]
pub struct AnswerPayload {
    pub answer: String,
}

/// Answer a question as the caller. Subscribers are notified afterwards.
#[utoipa::path(
    post,
    path = "/api/v1/answers",
    request_body = CreateAnswerPayload,
    responses(
        (status = 200, description = "Question Answered successfully", body = AnswerSchema),
        (status = 400, description = "Blank answer or malformed question id", body = ErrorSchema),
        (status = 401, description = "Not signed in", body = ErrorSchema),
        (status = 404, description = "Question not found", body = ErrorSchema)
    ),
    tags = ["answers"],
    operation_id = "createAnswer"
)]
#[post("/answers")]
pub async fn create_answer(
    state: web::Data<HttpState>,
    caller: AuthenticatedCaller,
    payload: web::Json<CreateAnswerPayload>,
) -> ApiResult<HttpResponse> {
    let CreateAnswerPayload { answer, question } = payload.into_inner();
    let text = parse_post_text(&answer, ANSWER)?;
    let question_id: QuestionId = parse_body_id(question, QUESTION)?;
    let answer = state
        .answers
        .answer(caller.caller(), &question_id, text)
        .await?;
    Ok(envelope::ok("Question Answered successfully", answer))
}

#[utoipa::path(
    get,
    path = "/api/v1/answers",
    responses((status = 200, description = "All answers", body = [AnswerSchema])),
    tags = ["answers"],
    operation_id = "listAnswers",
    security([])
)]
#[get("/answers")]
pub async fn list_answers(state: web::Data<HttpState>) -> ApiResult<HttpResponse> {
    let answers = state.answers_query.list_answers().await?;
    Ok(envelope::ok("All answers", answers))
}

#[utoipa::path(
    get,
    path = "/api/v1/answers/{id}",
    params(("id" = String, Path, description = "Answer id")),
    responses(
        (status = 200, description = "Single answer", body = AnswerSchema),
        (status = 404, description = "Answer not found", body = ErrorSchema)
    ),
    tags = ["answers"],
    operation_id = "getAnswer",
    security([])
)]
#[get("/answers/{id}")]
pub async fn get_answer(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id: AnswerId = parse_path_id(&path)?;
    let answer = state.answers_query.get_answer(&id).await?;
    Ok(envelope::ok("Single answer", answer))
}

/// Answers recorded for one question, oldest first.
#[utoipa::path(
    get,
    path = "/api/v1/answers/question/{id}",
    params(("id" = String, Path, description = "Question id")),
    responses(
        (status = 200, description = "All answers for single question", body = [AnswerSchema]),
        (status = 404, description = "Invalid id passed", body = ErrorSchema)
    ),
    tags = ["answers"],
    operation_id = "answersForQuestion",
    security([])
)]
#[get("/answers/question/{id}")]
pub async fn answers_for_question(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id: QuestionId = parse_path_id(&path)?;
    let answers = state.answers_query.answers_for_question(&id).await?;
    Ok(envelope::ok("All answers for single question", answers))
}

/// Replace the answer text. Author or admin only.
#[utoipa::path(
    put,
    path = "/api/v1/answers/{id}",
    params(("id" = String, Path, description = "Answer id")),
    request_body = AnswerPayload,
    responses(
        (status = 200, description = "Answer updated successfully", body = AnswerSchema),
        (status = 400, description = "Blank answer", body = ErrorSchema),
        (status = 401, description = "Not signed in or not the author", body = ErrorSchema),
        (status = 404, description = "Answer not found", body = ErrorSchema)
    ),
    tags = ["answers"],
    operation_id = "updateAnswer"
)]
#[put("/answers/{id}")]
pub async fn update_answer(
    state: web::Data<HttpState>,
    caller: AuthenticatedCaller,
    path: web::Path<String>,
    payload: web::Json<AnswerPayload>,
) -> ApiResult<HttpResponse> {
    let id: AnswerId = parse_path_id(&path)?;
    let text = parse_post_text(&payload.answer, ANSWER)?;
    let answer = state.answers.edit(caller.caller(), &id, text).await?;
    Ok(envelope::ok("Answer updated successfully", answer))
}

#[utoipa::path(
    put,
    path = "/api/v1/answers/{id}/vote",
    params(("id" = String, Path, description = "Answer id"), VoteQuery),
    responses(
        (status = 200, description = "Answer up-voted or down-voted", body = AnswerSchema),
        (status = 400, description = "Unreadable up flag", body = ErrorSchema),
        (status = 401, description = "Not signed in", body = ErrorSchema),
        (status = 404, description = "Answer not found", body = ErrorSchema)
    ),
    tags = ["answers"],
    operation_id = "voteAnswer"
)]
#[put("/answers/{id}/vote")]
pub async fn vote_answer(
    state: web::Data<HttpState>,
    _caller: AuthenticatedCaller,
    path: web::Path<String>,
    query: web::Query<VoteQuery>,
) -> ApiResult<HttpResponse> {
    let id: AnswerId = parse_path_id(&path)?;
    let direction = parse_vote_flag(query.up.as_deref())?;
    let answer = state.answers.vote(&id, direction).await?;
    Ok(envelope::ok(
        format!("Answer {} successfully", direction.verb()),
        answer,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Answer, Error, PostText, UserId, VoteDirection};
    use crate::inbound::http::auth::AUTH_TOKEN_HEADER;
    use crate::inbound::http::test_utils::{TEST_TOKEN, TestPorts, admin, member};
    use actix_web::http::StatusCode;
    use actix_web::test as actix_test;
    use chrono::Utc;
    use rstest::rstest;
    use serde_json::{Value, json};

    fn answer(author: UserId, question: QuestionId) -> Answer {
        Answer::new(
            author,
            question,
            PostText::new("A1").expect("text"),
            Utc::now(),
        )
    }

    #[rstest]
    #[actix_web::test]
    async fn answering_returns_ok_with_the_answer() {
        let question_id = QuestionId::random();
        let mut ports = TestPorts::signed_in(member());
        ports
            .answers
            .expect_answer()
            .withf(move |_, id, text| *id == question_id && text.as_ref() == "A1")
            .returning(|caller, id, _| Ok(answer(caller.user_id, *id)));
        let app = actix_test::init_service(ports.into_app()).await;

        let request = actix_test::TestRequest::post()
            .uri("/api/v1/answers")
            .insert_header((AUTH_TOKEN_HEADER, TEST_TOKEN))
            .set_json(json!({"answer": "A1", "question": question_id.to_string()}))
            .to_request();
        let response = actix_test::call_service(&app, request).await;

        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(body["message"], "Question Answered successfully");
        assert_eq!(body["body"]["questionId"], question_id.to_string());
    }

    #[rstest]
    #[case(json!({"answer": "A1"}), "missing_field")]
    #[case(json!({"answer": "A1", "question": "abc"}), "invalid_uuid")]
    #[case(json!({"answer": "", "question": "abc"}), "empty_field")]
    #[actix_web::test]
    async fn malformed_answers_are_rejected(#[case] payload: Value, #[case] code: &str) {
        let mut ports = TestPorts::signed_in(member());
        ports.answers.expect_answer().never();
        let app = actix_test::init_service(ports.into_app()).await;

        let request = actix_test::TestRequest::post()
            .uri("/api/v1/answers")
            .insert_header((AUTH_TOKEN_HEADER, TEST_TOKEN))
            .set_json(payload)
            .to_request();
        let response = actix_test::call_service(&app, request).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(body["details"]["code"], code);
    }

    #[rstest]
    #[actix_web::test]
    async fn answers_to_unknown_questions_are_not_found() {
        let mut ports = TestPorts::signed_in(member());
        ports
            .answers
            .expect_answer()
            .returning(|_, _, _| Err(Error::not_found("Question not found")));
        let app = actix_test::init_service(ports.into_app()).await;

        let request = actix_test::TestRequest::post()
            .uri("/api/v1/answers")
            .insert_header((AUTH_TOKEN_HEADER, TEST_TOKEN))
            .set_json(json!({"answer": "A1", "question": QuestionId::random().to_string()}))
            .to_request();
        let response = actix_test::call_service(&app, request).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(body["message"], "Question not found");
    }

    #[rstest]
    #[actix_web::test]
    async fn answers_for_a_question_are_public() {
        let question_id = QuestionId::random();
        let mut ports = TestPorts::default();
        ports
            .answers_query
            .expect_answers_for_question()
            .withf(move |id| *id == question_id)
            .returning(|id| Ok(vec![answer(UserId::random(), *id)]));
        let app = actix_test::init_service(ports.into_app()).await;

        let request = actix_test::TestRequest::get()
            .uri(&format!("/api/v1/answers/question/{question_id}"))
            .to_request();
        let response = actix_test::call_service(&app, request).await;

        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(body["message"], "All answers for single question");
        assert_eq!(body["body"][0]["text"], "A1");
    }

    #[rstest]
    #[actix_web::test]
    async fn admins_may_edit_any_answer() {
        let mut ports = TestPorts::signed_in(admin());
        ports
            .answers
            .expect_edit()
            .withf(|caller, _, _| caller.is_admin)
            .returning(|_, _, _| Ok(answer(UserId::random(), QuestionId::random())));
        let app = actix_test::init_service(ports.into_app()).await;

        let request = actix_test::TestRequest::put()
            .uri(&format!("/api/v1/answers/{}", AnswerId::random()))
            .insert_header((AUTH_TOKEN_HEADER, TEST_TOKEN))
            .set_json(json!({"answer": "Clarified"}))
            .to_request();
        let response = actix_test::call_service(&app, request).await;

        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(body["message"], "Answer updated successfully");
    }

    #[rstest]
    #[actix_web::test]
    async fn down_votes_report_their_direction() {
        let mut ports = TestPorts::signed_in(member());
        ports
            .answers
            .expect_vote()
            .withf(|_, direction| *direction == VoteDirection::Down)
            .returning(|_, _| Ok(answer(UserId::random(), QuestionId::random())));
        let app = actix_test::init_service(ports.into_app()).await;

        let request = actix_test::TestRequest::put()
            .uri(&format!("/api/v1/answers/{}/vote?up=false", AnswerId::random()))
            .insert_header((AUTH_TOKEN_HEADER, TEST_TOKEN))
            .to_request();
        let response = actix_test::call_service(&app, request).await;

        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(body["message"], "Answer down-voted successfully");
    }
}

//! Question subscription handlers.
//!
//! ```text
//! POST /api/v1/subscriptions/question {"question":"<question id>"}
//! GET  /api/v1/subscriptions/question/{id}
//! ```

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};

use crate::domain::QuestionId;
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::AuthenticatedCaller;
use crate::inbound::http::envelope;
use crate::inbound::http::schemas::{ErrorSchema, SubscriptionSchema};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_body_id, parse_path_id};

/// Subscribe body. The subscriber is always the caller.
#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(default)]
pub struct SubscribePayload {
    /// Id of the question to follow.
    pub question: Option<String>,
}

/// Follow a question. Subscribing twice returns the first subscription.
#[utoipa::path(
    post,
    path = "/api/v1/subscriptions/question",
    request_body = SubscribePayload,
    responses(
        (status = 201, description = "User subscribed to question successfully", body = SubscriptionSchema),
        (status = 400, description = "Missing or malformed question id", body = ErrorSchema),
        (status = 401, description = "Not signed in", body = ErrorSchema),
        (status = 404, description = "User or question does not exist", body = ErrorSchema)
    ),
    tags = ["subscriptions"],
    operation_id = "subscribeToQuestion"
)]
#[post("/subscriptions/question")]
pub async fn subscribe(
    state: web::Data<HttpState>,
    caller: AuthenticatedCaller,
    payload: web::Json<SubscribePayload>,
) -> ApiResult<HttpResponse> {
    let question_id: QuestionId =
        parse_body_id(payload.into_inner().question, FieldName::new("question"))?;
    let subscription = state
        .subscriptions
        .subscribe(caller.caller(), &question_id)
        .await?;
    Ok(envelope::created(
        "User subscribed to question successfully",
        subscription,
    ))
}

/// Subscribers of one question. Admin only.
#[utoipa::path(
    get,
    path = "/api/v1/subscriptions/question/{id}",
    params(("id" = String, Path, description = "Question id")),
    responses(
        (status = 200, description = "All subscribers for question", body = [SubscriptionSchema]),
        (status = 401, description = "Access Denied", body = ErrorSchema),
        (status = 404, description = "Question not found", body = ErrorSchema)
    ),
    tags = ["subscriptions"],
    operation_id = "listSubscribers"
)]
#[get("/subscriptions/question/{id}")]
pub async fn list_subscribers(
    state: web::Data<HttpState>,
    caller: AuthenticatedCaller,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let question_id: QuestionId = parse_path_id(&path)?;
    let subscribers = state
        .subscriptions
        .subscribers(caller.caller(), &question_id)
        .await?;
    Ok(envelope::ok("All subscribers for question", subscribers))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Error, Subscription};
    use crate::inbound::http::auth::AUTH_TOKEN_HEADER;
    use crate::inbound::http::test_utils::{TEST_TOKEN, TestPorts, admin, member};
    use actix_web::http::StatusCode;
    use actix_web::test as actix_test;
    use chrono::Utc;
    use rstest::rstest;
    use serde_json::{Value, json};

    #[rstest]
    #[actix_web::test]
    async fn subscribers_come_from_the_token_not_the_body() {
        let caller = member();
        let subscriber = caller.user_id;
        let mut ports = TestPorts::signed_in(caller);
        ports
            .subscriptions
            .expect_subscribe()
            .withf(move |caller, _| caller.user_id == subscriber)
            .returning(|caller, question| {
                Ok(Subscription::new(caller.user_id, *question, Utc::now()))
            });
        let app = actix_test::init_service(ports.into_app()).await;

        let request = actix_test::TestRequest::post()
            .uri("/api/v1/subscriptions/question")
            .insert_header((AUTH_TOKEN_HEADER, TEST_TOKEN))
            .set_json(json!({
                "question": QuestionId::random().to_string(),
                "user": "someone-else",
            }))
            .to_request();
        let response = actix_test::call_service(&app, request).await;

        assert_eq!(response.status(), StatusCode::CREATED);
        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(body["message"], "User subscribed to question successfully");
        assert_eq!(body["body"]["userId"], subscriber.to_string());
    }

    #[rstest]
    #[actix_web::test]
    async fn members_cannot_list_subscribers() {
        let mut ports = TestPorts::signed_in(member());
        ports
            .subscriptions
            .expect_subscribers()
            .returning(|_, _| Err(Error::unauthorized("Access Denied")));
        let app = actix_test::init_service(ports.into_app()).await;

        let request = actix_test::TestRequest::get()
            .uri(&format!(
                "/api/v1/subscriptions/question/{}",
                QuestionId::random()
            ))
            .insert_header((AUTH_TOKEN_HEADER, TEST_TOKEN))
            .to_request();
        let response = actix_test::call_service(&app, request).await;

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(body["message"], "Access Denied");
    }

    #[rstest]
    #[actix_web::test]
    async fn admins_list_subscribers() {
        let mut ports = TestPorts::signed_in(admin());
        ports.subscriptions.expect_subscribers().returning(|caller, question| {
            Ok(vec![Subscription::new(caller.user_id, *question, Utc::now())])
        });
        let app = actix_test::init_service(ports.into_app()).await;

        let request = actix_test::TestRequest::get()
            .uri(&format!(
                "/api/v1/subscriptions/question/{}",
                QuestionId::random()
            ))
            .insert_header((AUTH_TOKEN_HEADER, TEST_TOKEN))
            .to_request();
        let response = actix_test::call_service(&app, request).await;

        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(body["message"], "All subscribers for question");
        assert_eq!(body["body"].as_array().map(Vec::len), Some(1));
    }
}

//! Free-text search handlers.
//!
//! ```text
//! GET /api/v1/search/question?query=lifetimes
//! ```

use actix_web::{HttpResponse, get, web};
use serde::Deserialize;

use crate::domain::ports::SearchKind;
use crate::inbound::http::ApiResult;
use crate::inbound::http::envelope;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;

/// `?query=` shared by the search endpoints.
#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[serde(default)]
#[into_params(parameter_in = Query)]
pub struct SearchParams {
    /// Text to look for. Must not be blank.
    pub query: String,
}

async fn run(
    state: &HttpState,
    kind: SearchKind,
    params: SearchParams,
) -> ApiResult<HttpResponse> {
    let hits = state.search.search(kind, &params.query).await?;
    Ok(envelope::ok(
        format!("Search for {kind}: {}", params.query),
        hits,
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/search/user",
    params(SearchParams),
    responses(
        (status = 200, description = "Matching users", body = [serde_json::Value]),
        (status = 400, description = "query is required", body = ErrorSchema),
        (status = 503, description = "Search engine unavailable", body = ErrorSchema)
    ),
    tags = ["search"],
    operation_id = "searchUsers",
    security([])
)]
#[get("/search/user")]
pub async fn search_users(
    state: web::Data<HttpState>,
    params: web::Query<SearchParams>,
) -> ApiResult<HttpResponse> {
    run(&state, SearchKind::User, params.into_inner()).await
}

#[utoipa::path(
    get,
    path = "/api/v1/search/question",
    params(SearchParams),
    responses(
        (status = 200, description = "Matching questions", body = [serde_json::Value]),
        (status = 400, description = "query is required", body = ErrorSchema),
        (status = 503, description = "Search engine unavailable", body = ErrorSchema)
    ),
    tags = ["search"],
    operation_id = "searchQuestions",
    security([])
)]
#[get("/search/question")]
pub async fn search_questions(
    state: web::Data<HttpState>,
    params: web::Query<SearchParams>,
) -> ApiResult<HttpResponse> {
    run(&state, SearchKind::Question, params.into_inner()).await
}

#[utoipa::path(
    get,
    path = "/api/v1/search/answer",
    params(SearchParams),
    responses(
        (status = 200, description = "Matching answers", body = [serde_json::Value]),
        (status = 400, description = "query is required", body = ErrorSchema),
        (status = 503, description = "Search engine unavailable", body = ErrorSchema)
    ),
    tags = ["search"],
    operation_id = "searchAnswers",
    security([])
)]
#[get("/search/answer")]
pub async fn search_answers(
    state: web::Data<HttpState>,
    params: web::Query<SearchParams>,
) -> ApiResult<HttpResponse> {
    run(&state, SearchKind::Answer, params.into_inner()).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Error;
    use crate::inbound::http::test_utils::TestPorts;
    use actix_web::http::StatusCode;
    use actix_web::test as actix_test;
    use rstest::rstest;
    use serde_json::{Value, json};

    #[rstest]
    #[case("user", SearchKind::User, "Search for User: ada")]
    #[case("question", SearchKind::Question, "Search for Question: ada")]
    #[case("answer", SearchKind::Answer, "Search for Answer: ada")]
    #[actix_web::test]
    async fn each_route_searches_its_own_index(
        #[case] segment: &str,
        #[case] kind: SearchKind,
        #[case] message: &str,
    ) {
        let mut ports = TestPorts::default();
        ports
            .search
            .expect_search()
            .withf(move |got, query| *got == kind && query.trim() == "ada")
            .returning(|_, _| Ok(vec![json!({"id": "1", "text": "Ada"})]));
        let app = actix_test::init_service(ports.into_app()).await;

        let request = actix_test::TestRequest::get()
            .uri(&format!("/api/v1/search/{segment}?query=ada"))
            .to_request();
        let response = actix_test::call_service(&app, request).await;

        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(body["message"], message);
        assert_eq!(body["body"][0]["text"], "Ada");
    }

    #[rstest]
    #[actix_web::test]
    async fn engine_outages_are_service_unavailable() {
        let mut ports = TestPorts::default();
        ports
            .search
            .expect_search()
            .returning(|_, _| Err(Error::service_unavailable("Search is unavailable")));
        let app = actix_test::init_service(ports.into_app()).await;

        let request = actix_test::TestRequest::get()
            .uri("/api/v1/search/question?query=ada")
            .to_request();
        let response = actix_test::call_service(&app, request).await;

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(body["code"], "service_unavailable");
    }
}

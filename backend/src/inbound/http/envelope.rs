//! Success envelope shared by every `/api/v1` handler.
//!
//! ```text
//! {"message": "Single question", "body": {"id": "...", "text": "..."}}
//! ```

use actix_web::HttpResponse;
use actix_web::http::StatusCode;
use serde::Serialize;

/// `{message, body}` payload returned on success.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub message: String,
    pub body: T,
}

impl<T: Serialize> Envelope<T> {
    pub fn new(message: impl Into<String>, body: T) -> Self {
        Self {
            message: message.into(),
            body,
        }
    }

    fn respond(self, status: StatusCode) -> HttpResponse {
        HttpResponse::build(status).json(self)
    }
}

/// 200 with the envelope.
pub fn ok<T: Serialize>(message: impl Into<String>, body: T) -> HttpResponse {
    Envelope::new(message, body).respond(StatusCode::OK)
}

/// 201 with the envelope.
pub fn created<T: Serialize>(message: impl Into<String>, body: T) -> HttpResponse {
    Envelope::new(message, body).respond(StatusCode::CREATED)
}

/// Empty object used as `body` when there is nothing to return.
pub fn empty_body() -> serde_json::Map<String, serde_json::Value> {
    serde_json::Map::new()
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;
    use rstest::rstest;
    use serde_json::{Value, json};

    #[rstest]
    #[case(ok("All users", json!([])), StatusCode::OK)]
    #[case(created("User created successfully", json!([])), StatusCode::CREATED)]
    #[actix_web::test]
    async fn helpers_set_status_and_wrap_body(
        #[case] response: HttpResponse,
        #[case] status: StatusCode,
    ) {
        assert_eq!(response.status(), status);
        let bytes = to_bytes(response.into_body()).await.expect("body");
        let value: Value = serde_json::from_slice(&bytes).expect("json");
        assert_eq!(value["body"], json!([]));
        assert!(value["message"].is_string());
    }

    #[rstest]
    fn empty_body_serialises_as_object() {
        let value = serde_json::to_value(Envelope::new("done", empty_body())).expect("json");
        assert_eq!(value, json!({"message": "done", "body": {}}));
    }
}

//! Search delegate and best-effort index mirroring.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Value, json};
use tracing::warn;

use super::ports::{SearchIndex, SearchKind, SearchQuery};
use super::store_errors::search_backend;
use super::{Error, User};

/// Answers search requests by delegating to the index.
#[derive(Clone)]
pub struct SearchService {
    index: Arc<dyn SearchIndex>,
}

impl SearchService {
    pub fn new(index: Arc<dyn SearchIndex>) -> Self {
        Self { index }
    }
}

#[async_trait]
impl SearchQuery for SearchService {
    async fn search(&self, kind: SearchKind, query: &str) -> Result<Vec<Value>, Error> {
        let query = query.trim();
        if query.is_empty() {
            return Err(Error::invalid_request("query is required")
                .with_details(json!({ "field": "query", "code": "required" })));
        }
        self.index
            .search(kind, query)
            .await
            .map_err(search_backend)
    }
}

/// Copies entities into the search index after they change.
///
/// Failures are logged and dropped; the index is a mirror and never blocks a
/// write.
#[derive(Clone)]
pub struct SearchMirror {
    index: Arc<dyn SearchIndex>,
}

impl SearchMirror {
    pub fn new(index: Arc<dyn SearchIndex>) -> Self {
        Self { index }
    }

    /// Mirror a user without credentials or role.
    pub async fn user(&self, user: &User) {
        let document = json!({
            "id": user.id,
            "firstname": user.firstname.as_ref(),
            "lastname": user.lastname.as_ref(),
            "email": user.email.as_ref(),
        });
        self.put(SearchKind::User, document).await;
    }

    /// Mirror any serialisable entity keyed by its `id` field.
    pub async fn entity<T: Serialize + Sync>(&self, kind: SearchKind, entity: &T) {
        match serde_json::to_value(entity) {
            Ok(document) => self.put(kind, document).await,
            Err(error) => warn!(%kind, %error, "search document could not be serialised"),
        }
    }

    async fn put(&self, kind: SearchKind, document: Value) {
        if let Err(error) = self.index.index(kind, document).await {
            warn!(%kind, %error, "search index update failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{MockSearchIndex, SearchIndexError};
    use crate::domain::{ErrorCode, PostText, Question, UserId};
    use chrono::Utc;
    use mockall::predicate::eq;
    use rstest::rstest;

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[tokio::test]
    async fn blank_queries_are_rejected(#[case] query: &str) {
        let mut index = MockSearchIndex::new();
        index.expect_search().never();
        let service = SearchService::new(Arc::new(index));

        let err = service
            .search(SearchKind::Question, query)
            .await
            .expect_err("blank query");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
        assert_eq!(err.message(), "query is required");
    }

    #[tokio::test]
    async fn queries_are_trimmed_and_forwarded() {
        let mut index = MockSearchIndex::new();
        index
            .expect_search()
            .with(eq(SearchKind::Answer), eq("rust"))
            .times(1)
            .returning(|_, _| Ok(vec![json!({ "id": "1" })]));
        let service = SearchService::new(Arc::new(index));

        let hits = service
            .search(SearchKind::Answer, "  rust ")
            .await
            .expect("hits");
        assert_eq!(hits.len(), 1);
    }

    #[tokio::test]
    async fn backend_failures_are_service_unavailable() {
        let mut index = MockSearchIndex::new();
        index
            .expect_search()
            .returning(|_, _| Err(SearchIndexError::unavailable("connection refused")));
        let service = SearchService::new(Arc::new(index));

        let err = service
            .search(SearchKind::User, "ada")
            .await
            .expect_err("backend down");
        assert_eq!(err.code(), ErrorCode::ServiceUnavailable);
    }

    #[tokio::test]
    async fn mirror_swallows_index_failures() {
        let mut index = MockSearchIndex::new();
        index
            .expect_index()
            .withf(|kind, document| {
                *kind == SearchKind::Question && document["text"] == "Why?"
            })
            .times(1)
            .returning(|_, _| Err(SearchIndexError::unavailable("down")));
        let mirror = SearchMirror::new(Arc::new(index));

        let question = Question::new(
            UserId::random(),
            PostText::new("Why?").expect("text"),
            Utc::now(),
        );
        mirror.entity(SearchKind::Question, &question).await;
    }
}

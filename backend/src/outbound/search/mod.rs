//! Full-text search adapters.
//!
//! - [`MeilisearchIndex`] talks to a Meilisearch server.
//! - [`InMemorySearchIndex`] matches substrings in process; used when no
//!   search server is configured and in tests.

mod meilisearch;

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::ports::{SearchIndex, SearchIndexError, SearchKind};

pub use meilisearch::MeilisearchIndex;

/// Case-insensitive substring search over the string fields of each
/// document. Documents are replaced by `id`; hits keep insertion order.
#[derive(Debug, Clone, Default)]
pub struct InMemorySearchIndex {
    documents: Arc<Mutex<HashMap<SearchKind, Vec<Value>>>>,
}

impl InMemorySearchIndex {
    pub fn new() -> Self {
        Self::default()
    }

    fn documents(&self) -> MutexGuard<'_, HashMap<SearchKind, Vec<Value>>> {
        self.documents.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn matches(document: &Value, needle: &str) -> bool {
    document.as_object().is_some_and(|fields| {
        fields
            .values()
            .filter_map(Value::as_str)
            .any(|field| field.to_lowercase().contains(needle))
    })
}

#[async_trait]
impl SearchIndex for InMemorySearchIndex {
    async fn index(&self, kind: SearchKind, document: Value) -> Result<(), SearchIndexError> {
        let Some(id) = document.get("id").cloned() else {
            return Err(SearchIndexError::query("document has no id"));
        };
        let mut documents = self.documents();
        let collection = documents.entry(kind).or_default();
        match collection.iter_mut().find(|existing| existing.get("id") == Some(&id)) {
            Some(existing) => *existing = document,
            None => collection.push(document),
        }
        Ok(())
    }

    async fn search(&self, kind: SearchKind, query: &str) -> Result<Vec<Value>, SearchIndexError> {
        let needle = query.trim().to_lowercase();
        Ok(self
            .documents()
            .get(&kind)
            .map(|collection| {
                collection
                    .iter()
                    .filter(|document| matches(document, &needle))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case("lifetimes", 1)]
    #[case("LIFETIMES", 1)]
    #[case("borrow", 2)]
    #[case("gardening", 0)]
    #[tokio::test]
    async fn matches_any_string_field_ignoring_case(#[case] query: &str, #[case] hits: usize) {
        let index = InMemorySearchIndex::new();
        index
            .index(SearchKind::Question, json!({"id": "1", "text": "Explain lifetimes and borrowing"}))
            .await
            .expect("indexed");
        index
            .index(SearchKind::Question, json!({"id": "2", "text": "Borrow checker errors", "views": 3}))
            .await
            .expect("indexed");

        let found = index.search(SearchKind::Question, query).await.expect("searched");
        assert_eq!(found.len(), hits);
    }

    #[rstest]
    #[tokio::test]
    async fn reindexing_replaces_the_document() {
        let index = InMemorySearchIndex::new();
        index
            .index(SearchKind::Answer, json!({"id": "a", "text": "old wording"}))
            .await
            .expect("indexed");
        index
            .index(SearchKind::Answer, json!({"id": "a", "text": "new wording"}))
            .await
            .expect("reindexed");

        let found = index.search(SearchKind::Answer, "wording").await.expect("searched");
        assert_eq!(found, vec![json!({"id": "a", "text": "new wording"})]);
    }

    #[rstest]
    #[tokio::test]
    async fn kinds_are_searched_separately() {
        let index = InMemorySearchIndex::new();
        index
            .index(SearchKind::User, json!({"id": "u", "firstname": "Ada"}))
            .await
            .expect("indexed");
        assert!(index.search(SearchKind::Question, "ada").await.expect("searched").is_empty());
    }

    #[rstest]
    #[tokio::test]
    async fn documents_without_ids_are_refused() {
        let index = InMemorySearchIndex::new();
        let err = index
            .index(SearchKind::User, json!({"firstname": "Ada"}))
            .await
            .expect_err("no id");
        assert!(matches!(err, SearchIndexError::Query { .. }));
    }
}

//! Meilisearch-backed `SearchIndex`.

use async_trait::async_trait;
use meilisearch_sdk::client::Client;
use meilisearch_sdk::errors::{Error as MeiliError, ErrorCode};
use serde_json::Value;

use crate::domain::ports::{SearchIndex, SearchIndexError, SearchKind};

const PRIMARY_KEY: &str = "id";

/// One Meilisearch index per [`SearchKind`], named by
/// [`SearchKind::index_name`]. Indexes are created on first write.
pub struct MeilisearchIndex {
    client: Client,
}

impl MeilisearchIndex {
    /// # Errors
    ///
    /// [`SearchIndexError::Unavailable`] when the client cannot be built
    /// from `url`.
    pub fn new(url: &str, api_key: Option<&str>) -> Result<Self, SearchIndexError> {
        let client = Client::new(url, api_key).map_err(map_error)?;
        Ok(Self { client })
    }
}

fn map_error(error: MeiliError) -> SearchIndexError {
    match error {
        MeiliError::Meilisearch(error) => SearchIndexError::query(error.to_string()),
        other => SearchIndexError::unavailable(other.to_string()),
    }
}

fn is_missing_index(error: &MeiliError) -> bool {
    matches!(
        error,
        MeiliError::Meilisearch(inner) if matches!(inner.error_code, ErrorCode::IndexNotFound)
    )
}

#[async_trait]
impl SearchIndex for MeilisearchIndex {
    async fn index(&self, kind: SearchKind, document: Value) -> Result<(), SearchIndexError> {
        // Enqueues an asynchronous task; the document becomes searchable once
        // Meilisearch processes it.
        self.client
            .index(kind.index_name())
            .add_or_update(&[document], Some(PRIMARY_KEY))
            .await
            .map(|_task| ())
            .map_err(map_error)
    }

    async fn search(&self, kind: SearchKind, query: &str) -> Result<Vec<Value>, SearchIndexError> {
        let index = self.client.index(kind.index_name());
        match index.search().with_query(query).execute::<Value>().await {
            Ok(results) => Ok(results.hits.into_iter().map(|hit| hit.result).collect()),
            // Nothing has been mirrored for this kind yet.
            Err(error) if is_missing_index(&error) => Ok(Vec::new()),
            Err(error) => Err(map_error(error)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn clients_build_without_contacting_the_server() {
        assert!(MeilisearchIndex::new("http://127.0.0.1:7700", Some("master-key")).is_ok());
    }

    #[rstest]
    fn transport_failures_are_outages() {
        let err = map_error(MeiliError::Timeout);
        assert!(matches!(err, SearchIndexError::Unavailable { .. }));
        assert!(!is_missing_index(&MeiliError::Timeout));
    }
}

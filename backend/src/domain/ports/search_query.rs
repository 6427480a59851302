//! Driving port for free-text search.

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::Error;

use super::SearchKind;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SearchQuery: Send + Sync {
    /// Ranked hits for a non-blank `query`.
    async fn search(&self, kind: SearchKind, query: &str) -> Result<Vec<Value>, Error>;
}

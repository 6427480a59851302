//! Port over the full-text search mirror.
use std::fmt;

use async_trait::async_trait;
use serde_json::Value;

use super::define_port_error;

define_port_error! {
    /// Errors raised by search adapters.
    pub enum SearchIndexError {
        /// The search engine could not be reached.
        Unavailable { message: String } => "search engine unavailable: {message}",
        /// The engine rejected the request or returned an unusable response.
        Query { message: String } => "search request failed: {message}",
    }
}

/// Collection mirrored into the search engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SearchKind {
    User,
    Question,
    Answer,
}

impl SearchKind {
    /// Index name in the search engine.
    pub fn index_name(self) -> &'static str {
        match self {
            Self::User => "users",
            Self::Question => "questions",
            Self::Answer => "answers",
        }
    }
}

impl fmt::Display for SearchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::User => "User",
            Self::Question => "Question",
            Self::Answer => "Answer",
        })
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SearchIndex: Send + Sync {
    /// Add or replace `document`, keyed by its `id` field.
    async fn index(&self, kind: SearchKind, document: Value) -> Result<(), SearchIndexError>;

    /// Ranked hits for `query`.
    async fn search(&self, kind: SearchKind, query: &str) -> Result<Vec<Value>, SearchIndexError>;
}

//! HTTP server configuration object and helpers.

use std::net::SocketAddr;
use std::sync::Arc;

use qanda::domain::DispatcherConfig;
use qanda::domain::ports::{MessageQueue, SearchIndex, TokenService};
use qanda::outbound::persistence::DbPool;
use qanda::outbound::queue::LoggingQueue;
use qanda::outbound::search::InMemorySearchIndex;
use url::Url;

/// Builder-style configuration for creating the HTTP server.
///
/// Without a pool the server keeps everything in process memory; without a
/// broker or search engine it falls back to [`LoggingQueue`] and
/// [`InMemorySearchIndex`].
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) app_url: Url,
    pub(crate) tokens: Arc<dyn TokenService>,
    pub(crate) db_pool: Option<DbPool>,
    pub(crate) queue: Arc<dyn MessageQueue>,
    pub(crate) search_index: Arc<dyn SearchIndex>,
    pub(crate) dispatcher: DispatcherConfig,
}

impl ServerConfig {
    #[must_use]
    pub fn new(bind_addr: SocketAddr, app_url: Url, tokens: Arc<dyn TokenService>) -> Self {
        Self {
            bind_addr,
            app_url,
            tokens,
            db_pool: None,
            queue: Arc::new(LoggingQueue),
            search_index: Arc::new(InMemorySearchIndex::new()),
            dispatcher: DispatcherConfig::default(),
        }
    }

    /// Attach a database connection pool for the Diesel repositories.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    #[must_use]
    pub fn with_queue(mut self, queue: Arc<dyn MessageQueue>) -> Self {
        self.queue = queue;
        self
    }

    #[must_use]
    pub fn with_search_index(mut self, index: Arc<dyn SearchIndex>) -> Self {
        self.search_index = index;
        self
    }

    #[must_use]
    pub fn with_dispatcher(mut self, dispatcher: DispatcherConfig) -> Self {
        self.dispatcher = dispatcher;
        self
    }
}

//! Application settings loaded via OrthoConfig.
//!
//! Every value can come from CLI flags, `QANDA_*` environment variables, or
//! a configuration file. Optional fields fall back to the defaults below; an
//! absent `database_url`, `rabbitmq_url`, or `meilisearch_url` selects the
//! in-process adapter for that concern.

use std::net::SocketAddr;
use std::time::Duration;

use chrono::TimeDelta;
use ortho_config::OrthoConfig;
use serde::Deserialize;
use url::Url;

use crate::outbound::queue::RabbitMqSettings;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_APP_URL: &str = "http://localhost:8080";
const DEFAULT_RABBITMQ_USERNAME: &str = "guest";
const DEFAULT_RABBITMQ_PASSWORD: &str = "guest";
const DEFAULT_RABBITMQ_VHOST: &str = "/";

/// Raised when a configured value cannot be used.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid bind address {value:?}: {source}")]
    BindAddr {
        value: String,
        source: std::net::AddrParseError,
    },
    #[error("invalid {field} URL {value:?}: {source}")]
    Url {
        field: &'static str,
        value: String,
        source: url::ParseError,
    },
    #[error("token_secret must be set in release builds")]
    MissingTokenSecret,
}

/// Runtime configuration for the forum server.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "QANDA")]
pub struct AppSettings {
    /// Socket address the HTTP server listens on.
    pub bind_addr: Option<String>,
    /// PostgreSQL connection string.
    pub database_url: Option<String>,
    /// Key signing session tokens.
    pub token_secret: Option<String>,
    /// Session token lifetime in seconds.
    #[ortho_config(default = 86_400)]
    pub token_ttl_secs: u64,
    /// Public base URL used to build password reset links.
    pub app_url: Option<String>,
    /// RabbitMQ management API base URL.
    pub rabbitmq_url: Option<String>,
    pub rabbitmq_username: Option<String>,
    pub rabbitmq_password: Option<String>,
    pub rabbitmq_vhost: Option<String>,
    /// Meilisearch base URL.
    pub meilisearch_url: Option<String>,
    /// Meilisearch API key.
    pub meilisearch_key: Option<String>,
    /// Outbox poll interval in milliseconds.
    #[ortho_config(default = 2_000)]
    pub dispatcher_poll_ms: u64,
}

fn parse_url(field: &'static str, value: &str) -> Result<Url, ConfigError> {
    Url::parse(value).map_err(|source| ConfigError::Url {
        field,
        value: value.to_owned(),
        source,
    })
}

impl AppSettings {
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        let value = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        value.parse().map_err(|source| ConfigError::BindAddr {
            value: value.to_owned(),
            source,
        })
    }

    pub fn app_url(&self) -> Result<Url, ConfigError> {
        parse_url("app", self.app_url.as_deref().unwrap_or(DEFAULT_APP_URL))
    }

    pub fn token_ttl(&self) -> TimeDelta {
        TimeDelta::try_seconds(i64::try_from(self.token_ttl_secs).unwrap_or(i64::MAX))
            .unwrap_or(TimeDelta::MAX)
    }

    /// Configured signing secret.
    ///
    /// `Ok(None)` means "use an ephemeral secret", which is only allowed in
    /// debug builds.
    pub fn token_secret(&self) -> Result<Option<&str>, ConfigError> {
        match self.token_secret.as_deref().filter(|s| !s.is_empty()) {
            Some(secret) => Ok(Some(secret)),
            None if cfg!(debug_assertions) => Ok(None),
            None => Err(ConfigError::MissingTokenSecret),
        }
    }

    /// Broker connection details, when a broker URL is configured.
    pub fn rabbitmq(&self) -> Result<Option<RabbitMqSettings>, ConfigError> {
        let Some(raw) = self.rabbitmq_url.as_deref() else {
            return Ok(None);
        };
        Ok(Some(RabbitMqSettings {
            url: parse_url("rabbitmq", raw)?,
            username: self
                .rabbitmq_username
                .clone()
                .unwrap_or_else(|| DEFAULT_RABBITMQ_USERNAME.to_owned()),
            password: self
                .rabbitmq_password
                .clone()
                .unwrap_or_else(|| DEFAULT_RABBITMQ_PASSWORD.to_owned()),
            vhost: self
                .rabbitmq_vhost
                .clone()
                .unwrap_or_else(|| DEFAULT_RABBITMQ_VHOST.to_owned()),
        }))
    }

    pub fn dispatcher_poll_interval(&self) -> Duration {
        Duration::from_millis(self.dispatcher_poll_ms)
    }
}

//! RabbitMQ publisher using the management plugin's HTTP API.
//!
//! Messages go to the default exchange with the queue name as routing key,
//! so they land on the queue of that name. The broker answers
//! `{"routed": false}` when no such queue exists; that is reported as a
//! rejection so the dispatcher retries once consumers have declared it.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::ports::{MessageQueue, MessageQueueError};

/// Connection details for the management API.
#[derive(Debug, Clone)]
pub struct RabbitMqSettings {
    /// Management API base, e.g. `http://localhost:15672`.
    pub url: Url,
    pub username: String,
    pub password: String,
    pub vhost: String,
}

/// Errors raised while constructing the publisher.
#[derive(Debug, thiserror::Error)]
pub enum QueueSetupError {
    #[error("RabbitMQ URL cannot carry a path: {url}")]
    InvalidUrl { url: String },
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

#[derive(Serialize)]
struct PublishRequest<'a> {
    properties: Value,
    routing_key: &'a str,
    payload: String,
    payload_encoding: &'static str,
}

#[derive(Deserialize)]
struct PublishResponse {
    routed: bool,
}

/// [`MessageQueue`] backed by RabbitMQ's `amq.default` exchange.
pub struct RabbitMqHttpQueue {
    client: Client,
    endpoint: Url,
    username: String,
    password: String,
}

impl RabbitMqHttpQueue {
    /// # Errors
    ///
    /// [`QueueSetupError`] when the URL cannot be extended with the publish
    /// path or the HTTP client cannot be built.
    pub fn new(settings: RabbitMqSettings, timeout: Duration) -> Result<Self, QueueSetupError> {
        let endpoint = publish_endpoint(&settings.url, &settings.vhost)?;
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint,
            username: settings.username,
            password: settings.password,
        })
    }
}

fn publish_endpoint(base: &Url, vhost: &str) -> Result<Url, QueueSetupError> {
    let mut endpoint = base.clone();
    endpoint
        .path_segments_mut()
        .map_err(|()| QueueSetupError::InvalidUrl {
            url: base.to_string(),
        })?
        .pop_if_empty()
        .extend(["api", "exchanges"])
        .push(vhost)
        .extend(["amq.default", "publish"]);
    Ok(endpoint)
}

fn publish_request<'a>(queue: &'a str, payload: &Value) -> PublishRequest<'a> {
    PublishRequest {
        properties: Value::Object(serde_json::Map::new()),
        routing_key: queue,
        payload: payload.to_string(),
        payload_encoding: "string",
    }
}

#[async_trait]
impl MessageQueue for RabbitMqHttpQueue {
    async fn publish(&self, queue: &str, payload: &Value) -> Result<(), MessageQueueError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .basic_auth(&self.username, Some(&self.password))
            .json(&publish_request(queue, payload))
            .send()
            .await
            .map_err(|err| MessageQueueError::unavailable(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(map_status_error(status, &body));
        }
        let outcome: PublishResponse = response
            .json()
            .await
            .map_err(|err| MessageQueueError::rejected(format!("unreadable response: {err}")))?;
        if !outcome.routed {
            return Err(MessageQueueError::rejected(format!(
                "no queue named {queue} is bound"
            )));
        }
        Ok(())
    }
}

fn map_status_error(status: StatusCode, body: &str) -> MessageQueueError {
    const PREVIEW_CHAR_LIMIT: usize = 160;
    let preview: String = body.chars().take(PREVIEW_CHAR_LIMIT).collect();
    let message = format!("status {}: {}", status.as_u16(), preview.trim());
    if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
        MessageQueueError::unavailable(message)
    } else {
        MessageQueueError::rejected(message)
    }
}

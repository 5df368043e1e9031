//! Chat-completion client with transport abstraction and retries.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::config::ApiKey;

use super::{
    retry::BackoffPolicy,
    types::{ChatRequest, ChatResponse, Message},
};

/// Errors surfaced by a chat request.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    /// Connection, timeout or body-read failure.
    #[error("transport error: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The endpoint answered with a non-success status.
    #[error("endpoint returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// A success response whose body is not a completion payload.
    #[error("undecodable completion payload: {0}")]
    Decode(String),

    /// The first choice carried no text content.
    #[error("completion contained no message content")]
    EmptyCompletion,

    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    Build(#[source] reqwest::Error),
}

impl ChatError {
    /// Only transport failures are worth another attempt.
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}

/// One round trip to a chat-completion endpoint, without retries.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, ChatError>;
}

/// HTTPS transport speaking the OpenAI chat-completions protocol.
pub struct OpenAiTransport {
    http: Client,
    endpoint: String,
    api_key: ApiKey,
}

impl OpenAiTransport {
    pub fn new(
        endpoint: impl Into<String>,
        api_key: ApiKey,
        timeout: Duration,
    ) -> Result<Self, ChatError> {
        let http = Client::builder()
            .user_agent(concat!("biblio-assistant/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .gzip(true)
            .brotli(true)
            .build()
            .map_err(ChatError::Build)?;
        Ok(Self {
            http,
            endpoint: endpoint.into(),
            api_key,
        })
    }
}

#[async_trait]
impl ChatTransport for OpenAiTransport {
    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, ChatError> {
        let resp = self
            .http
            .post(&self.endpoint)
            .bearer_auth(self.api_key.expose())
            .json(request)
            .send()
            .await
            .map_err(|e| ChatError::Transport(Box::new(e)))?;
        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| ChatError::Transport(Box::new(e)))?;
        if !status.is_success() {
            return Err(ChatError::Status {
                status: status.as_u16(),
                body,
            });
        }
        serde_json::from_str(&body).map_err(|e| ChatError::Decode(e.to_string()))
    }
}

/// Retrying front for a [`ChatTransport`].
pub struct ChatClient<T> {
    transport: T,
    model: String,
    temperature: f32,
    backoff: BackoffPolicy,
}

impl<T: ChatTransport> ChatClient<T> {
    pub fn new(transport: T, model: impl Into<String>, backoff: BackoffPolicy) -> Self {
        Self {
            transport,
            model: model.into(),
            temperature: 0.0,
            backoff,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Plain chat request with the client's model and temperature.
    pub async fn chat(&self, messages: Vec<Message>) -> Result<ChatResponse, ChatError> {
        self.send(messages, None, None, self.temperature, &self.model)
            .await
    }

    /// Send a request, retrying transport failures per the backoff policy.
    ///
    /// Non-success statuses come back as [`ChatError::Status`] on the first
    /// attempt. Once the attempt budget is spent the last transport error is
    /// returned.
    #[instrument(skip(self, messages, functions, function_call), fields(messages = messages.len()))]
    pub async fn send(
        &self,
        messages: Vec<Message>,
        functions: Option<Value>,
        function_call: Option<Value>,
        temperature: f32,
        model: &str,
    ) -> Result<ChatResponse, ChatError> {
        let request = ChatRequest {
            model: model.to_string(),
            messages,
            temperature,
            functions,
            function_call,
        };

        let mut attempt = 1;
        loop {
            match self.transport.complete(&request).await {
                Ok(response) => {
                    debug!(attempt, "chat completion received");
                    return Ok(response);
                }
                Err(err) if err.is_retryable() && attempt < self.backoff.max_attempts => {
                    let delay = self.backoff.delay(attempt, &mut rand::thread_rng());
                    warn!(%err, attempt, ?delay, "chat request failed, retrying");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => {
                    warn!(%err, attempt, "unable to generate chat completion");
                    return Err(err);
                }
            }
        }
    }
}

//! Chat-completion client layer.

pub mod client;
pub mod retry;
pub mod types;

pub use client::{ChatClient, ChatError, ChatTransport, OpenAiTransport};
pub use retry::BackoffPolicy;
pub use types::{ChatRequest, ChatResponse, Message, Role};

pub const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "gpt-4o";

use anyhow::Result;

use crate::config::Settings;

/// Build the production client from resolved settings.
pub fn client_from_settings(settings: &Settings) -> Result<ChatClient<OpenAiTransport>> {
    let api_key = settings.require_api_key()?.clone();
    let transport =
        OpenAiTransport::new(&settings.endpoint, api_key, settings.request_timeout)?;
    Ok(ChatClient::new(transport, &settings.model, settings.backoff())
        .with_temperature(settings.temperature))
}

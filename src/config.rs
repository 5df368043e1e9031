//! Runtime configuration utilities for biblio-assistant.

use std::{
    env, fmt,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{anyhow, Context};

use crate::llm::{BackoffPolicy, DEFAULT_ENDPOINT, DEFAULT_MODEL};

/// Secret bearer token for the chat-completion endpoint.
///
/// `Debug` never prints the value, so settings can be logged freely.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Raw token, only meant for the `Authorization` header.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

/// Application configuration resolved from `.env` and defaults.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Bearer token; `None` until `OPENAI_API_KEY` is set.
    pub api_key: Option<ApiKey>,
    /// Chat model identifier.
    pub model: String,
    /// Chat-completion endpoint URL.
    pub endpoint: String,
    /// Sampling temperature sent with every request.
    pub temperature: f32,
    /// Total attempts per request, first try included.
    pub max_attempts: u32,
    /// Lower bound of the randomized backoff.
    pub backoff_min: Duration,
    /// Upper bound of the randomized backoff.
    pub backoff_max: Duration,
    /// Per-request transport timeout.
    pub request_timeout: Duration,
    /// Root folder for generated workbooks.
    pub outputs_dir: PathBuf,
}

impl Settings {
    /// Load configuration from environment with reasonable defaults.
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let api_key = env::var("OPENAI_API_KEY")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(ApiKey::new);
        let model = env::var("OPENAI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        let endpoint =
            env::var("OPENAI_API_URL").unwrap_or_else(|_| DEFAULT_ENDPOINT.to_string());
        let temperature = parse_var("OPENAI_TEMPERATURE").unwrap_or(0.0);
        let max_attempts = parse_var("MAX_ATTEMPTS").unwrap_or(3);
        let backoff_min = Duration::from_secs(parse_var("BACKOFF_MIN_SECS").unwrap_or(1));
        let backoff_max = Duration::from_secs(parse_var("BACKOFF_MAX_SECS").unwrap_or(40));
        let request_timeout =
            Duration::from_secs(parse_var("REQUEST_TIMEOUT_SECS").unwrap_or(120));
        let outputs_dir = env::var("OUTPUTS_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./outputs"));

        std::fs::create_dir_all(&outputs_dir).context("creating outputs dir")?;

        Ok(Self {
            api_key,
            model,
            endpoint,
            temperature,
            max_attempts,
            backoff_min,
            backoff_max,
            request_timeout,
            outputs_dir,
        })
    }

    /// The API key, or an error naming the variable to set.
    pub fn require_api_key(&self) -> anyhow::Result<&ApiKey> {
        self.api_key
            .as_ref()
            .ok_or_else(|| anyhow!("missing OPENAI_API_KEY; set it in the environment or .env"))
    }

    /// Retry policy derived from the configured bounds.
    pub fn backoff(&self) -> BackoffPolicy {
        BackoffPolicy::new(self.max_attempts, self.backoff_min, self.backoff_max)
    }

    /// Convenience helper for derived output path segments.
    pub fn join_output<P: AsRef<Path>>(&self, path: P) -> PathBuf {
        self.outputs_dir.join(path)
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

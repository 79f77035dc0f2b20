//! External LLM provider implementations.
//!
//! Each provider speaks its own HTTP dialect. The dialect is picked once,
//! from the tagged `LLMProvider`, in `Gateway::backend`.

use std::time::Duration;

use async_trait::async_trait;
use quicksense_core::{Error, Result};
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::types::{ChatMessage, LLMProvider, ProviderConfig};

pub const TONGYI_BASE_URL: &str = "https://dashscope.aliyuncs.com";
pub const OPENAI_BASE_URL: &str = "https://api.openai.com";

const TONGYI_GENERATION_PATH: &str = "/api/v1/services/aigc/text-generation/generation";
const OPENAI_COMPLETIONS_PATH: &str = "/v1/chat/completions";

/// One provider dialect: request shape, auth, and reply extraction.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    fn provider(&self) -> LLMProvider;

    /// Send the conversation and return the single textual reply.
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String>;
}

/// Provider-agnostic completion entry point used by the panel session.
#[async_trait]
pub trait Completer: Send + Sync {
    async fn complete(&self, messages: &[ChatMessage], config: &ProviderConfig) -> Result<String>;
}

/// Tongyi (DashScope) text-generation API.
pub struct TongyiBackend {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
}

#[async_trait]
impl CompletionBackend for TongyiBackend {
    fn provider(&self) -> LLMProvider {
        LLMProvider::Tongyi
    }

    async fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
        let url = format!("{}{}", self.base_url, TONGYI_GENERATION_PATH);
        let body = json!({
            "model": self.model,
            "input": { "messages": messages },
        });

        let reply = post_json(&self.client, &url, &self.api_key, &body, |v| {
            v["message"].as_str().map(str::to_string)
        })
        .await?;

        // Plain result format puts the text at output.text; the
        // message result format uses an OpenAI-like choices array.
        reply["output"]["text"]
            .as_str()
            .or_else(|| reply["output"]["choices"][0]["message"]["content"].as_str())
            .map(str::to_string)
            .ok_or_else(|| Error::Provider("Tongyi response contained no text".into()))
    }
}

/// OpenAI chat completions API.
pub struct OpenAIBackend {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
}

#[async_trait]
impl CompletionBackend for OpenAIBackend {
    fn provider(&self) -> LLMProvider {
        LLMProvider::OpenAI
    }

    async fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
        let url = format!("{}{}", self.base_url, OPENAI_COMPLETIONS_PATH);
        let body = json!({
            "model": self.model,
            "messages": messages,
        });

        let reply = post_json(&self.client, &url, &self.api_key, &body, |v| {
            v["error"]["message"].as_str().map(str::to_string)
        })
        .await?;

        reply["choices"][0]["message"]["content"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| Error::Provider("OpenAI response contained no choices".into()))
    }
}

/// POST a JSON body with bearer auth and return the parsed JSON reply.
///
/// Non-2xx statuses become `Error::Provider` carrying the upstream error
/// message when `error_message` finds one, else the status line.
async fn post_json(
    client: &Client,
    url: &str,
    api_key: &str,
    body: &Value,
    error_message: fn(&Value) -> Option<String>,
) -> Result<Value> {
    debug!("POST {}", url);

    let response = client
        .post(url)
        .header("Authorization", format!("Bearer {}", api_key))
        .header("Content-Type", "application/json")
        .json(body)
        .send()
        .await
        .map_err(transport_error)?;

    let status = response.status();
    if !status.is_success() {
        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<Value>(&text)
            .ok()
            .as_ref()
            .and_then(error_message)
            .unwrap_or_else(|| status_text(status));
        warn!("Provider returned {}: {}", status, message);
        return Err(Error::Provider(message));
    }

    response
        .json::<Value>()
        .await
        .map_err(|e| Error::Provider(format!("Invalid response body: {}", e)))
}

fn transport_error(e: reqwest::Error) -> Error {
    if e.is_timeout() {
        Error::Provider("Request timed out".into())
    } else {
        Error::Provider(format!("Request failed: {}", e))
    }
}

fn status_text(status: StatusCode) -> String {
    match status.canonical_reason() {
        Some(reason) => format!("{} {}", status.as_u16(), reason),
        None => status.as_u16().to_string(),
    }
}

/// Gateway over all supported providers.
pub struct Gateway {
    client: Client,
    tongyi_base_url: String,
    openai_base_url: String,
}

impl Gateway {
    /// Create a gateway whose requests fail with `Error::Provider` after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("QuickSense/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::Http(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            tongyi_base_url: TONGYI_BASE_URL.into(),
            openai_base_url: OPENAI_BASE_URL.into(),
        })
    }

    /// Point a provider at a different host (proxies, tests).
    pub fn with_base_url(mut self, provider: LLMProvider, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        match provider {
            LLMProvider::Tongyi => self.tongyi_base_url = base_url,
            LLMProvider::OpenAI => self.openai_base_url = base_url,
        }
        self
    }

    /// Build the backend for a provider config.
    pub fn backend(&self, config: &ProviderConfig) -> Box<dyn CompletionBackend> {
        match config.provider {
            LLMProvider::Tongyi => Box::new(TongyiBackend {
                client: self.client.clone(),
                base_url: self.tongyi_base_url.clone(),
                api_key: config.api_key.clone(),
                model: config.model.clone(),
            }),
            LLMProvider::OpenAI => Box::new(OpenAIBackend {
                client: self.client.clone(),
                base_url: self.openai_base_url.clone(),
                api_key: config.api_key.clone(),
                model: config.model.clone(),
            }),
        }
    }

    /// Check a key with a minimal completion.
    pub async fn verify_key(&self, config: &ProviderConfig) -> Result<()> {
        self.backend(config)
            .complete(&[ChatMessage::user("Hi")])
            .await
            .map(|_| ())
    }
}

#[async_trait]
impl Completer for Gateway {
    async fn complete(&self, messages: &[ChatMessage], config: &ProviderConfig) -> Result<String> {
        debug!(
            "Completing {} messages with {} ({})",
            messages.len(),
            config.provider,
            config.model
        );
        self.backend(config).complete(messages).await
    }
}

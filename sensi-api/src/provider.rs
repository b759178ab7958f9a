//! Completion provider used by device lookup.
//!
//! Only one call shape is needed (system prompt + user prompt → text), so
//! the trait is narrow. The bundled implementation speaks the OpenAI
//! `chat/completions` protocol, which most hosted and local model servers
//! accept.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use sensi_common::{Error, LlmConfig, Result};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Text completion backend.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Provider name for logs.
    fn name(&self) -> &str;

    /// Send one system + user prompt pair and return the reply text.
    async fn complete(&self, system: &str, prompt: &str) -> Result<String>;
}

/// OpenAI-compatible chat completions client.
pub struct OpenAiProvider {
    client: reqwest::Client,
    base_url: String,
    model: String,
    max_retries: u32,
    retry_backoff: Duration,
}

impl OpenAiProvider {
    pub fn new(
        base_url: impl Into<String>,
        api_key: &str,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", api_key))
            .map_err(|_| Error::Config("LLM API key contains invalid header characters".into()))?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(AUTHORIZATION, auth);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            max_retries: 0,
            retry_backoff: Duration::from_millis(500),
        })
    }

    /// Build from configuration. `None` when the provider is disabled or has
    /// no API key.
    pub fn from_config(config: &LlmConfig) -> Result<Option<Self>> {
        let api_key = match config.api_key.as_deref() {
            Some(key) if config.is_usable() => key,
            _ => return Ok(None),
        };

        let provider = Self::new(
            &config.base_url,
            api_key,
            &config.model,
            Duration::from_secs(config.timeout_secs),
        )?
        .with_retries(config.max_retries, Duration::from_millis(500));
        Ok(Some(provider))
    }

    pub fn with_retries(mut self, max_retries: u32, backoff: Duration) -> Self {
        self.max_retries = max_retries;
        self.retry_backoff = backoff;
        self
    }

    async fn try_complete(&self, url: &str, request: &ChatRequest<'_>) -> Result<String> {
        let start = Instant::now();

        let response = self
            .client
            .post(url)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    Error::Timeout
                } else {
                    Error::External(format!("Request failed: {}", e))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::External(format!(
                "API error: HTTP {} - {}",
                status, body
            )));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| Error::External(format!("Failed to parse response: {}", e)))?;

        debug!(
            model = %self.model,
            latency_ms = start.elapsed().as_millis() as u64,
            "Completion received"
        );

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| Error::External("Response contained no choices".into()))
    }
}

#[async_trait]
impl CompletionProvider for OpenAiProvider {
    fn name(&self) -> &str {
        "openai"
    }

    async fn complete(&self, system: &str, prompt: &str) -> Result<String> {
        let url = format!("{}/v1/chat/completions", self.base_url);
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: 0.0,
        };

        let mut last_error = None;
        for attempt in 1..=self.max_retries + 1 {
            match self.try_complete(&url, &request).await {
                Ok(content) => return Ok(content),
                Err(e) => {
                    warn!(
                        attempt,
                        max_attempts = self.max_retries + 1,
                        error = %e,
                        "Completion request failed"
                    );
                    last_error = Some(e);
                    if attempt <= self.max_retries {
                        tokio::time::sleep(self.retry_backoff).await;
                    }
                }
            }
        }

        Err(last_error.unwrap_or_else(|| Error::External("Unknown error".into())))
    }
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f64,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config_requires_key() {
        let mut config = LlmConfig::default();
        assert!(OpenAiProvider::from_config(&config).unwrap().is_none());

        config.api_key = Some("sk-test".into());
        assert!(OpenAiProvider::from_config(&config).unwrap().is_some());

        config.enabled = false;
        assert!(OpenAiProvider::from_config(&config).unwrap().is_none());
    }

    #[test]
    fn test_unusable_api_key_is_config_error() {
        let mut config = LlmConfig::default();
        config.api_key = Some("sk-bad\nkey".into());

        let err = OpenAiProvider::from_config(&config).err().unwrap();
        assert_eq!(err.code(), "CONFIG_ERROR");

        let err = OpenAiProvider::new("http://localhost", "sk-\u{0}", "m", Duration::from_secs(1))
            .err()
            .unwrap();
        assert_eq!(err.code(), "CONFIG_ERROR");
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let provider = OpenAiProvider::new(
            "http://localhost:8080/",
            "key",
            "model",
            Duration::from_secs(1),
        )
        .unwrap();
        assert_eq!(provider.base_url, "http://localhost:8080");
    }
}

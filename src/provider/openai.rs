//! OpenAI-compatible provider
//!
//! Executes prompts via the Chat Completions API of any OpenAI-compatible
//! server. The base URL is configurable so local backends (LM Studio,
//! llama.cpp server, vLLM) work the same as the hosted API; the API key is
//! optional because local servers usually ignore it.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{Completion, CompletionRequest, Provider, ProviderError};
use crate::config::Config;

/// Default request timeout (60 seconds)
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
/// Fallback model when neither the request nor the config names one
const DEFAULT_MODEL: &str = "gpt-4o";

/// Provider for OpenAI-compatible chat completion endpoints.
#[derive(Debug)]
pub struct OpenAiProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
}

impl OpenAiProvider {
    /// Create a provider from configuration.
    pub fn new(config: &Config) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .connect_timeout(Duration::from_secs(10))
            .user_agent("flowlab-cli/0.1")
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            model: config
                .model
                .clone()
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        }
    }

    /// Set the default model to use
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    fn build_messages(request: &CompletionRequest) -> Vec<ChatMessage> {
        let mut messages = Vec::new();
        if let Some(ref system) = request.system_prompt {
            messages.push(ChatMessage {
                role: "system".to_string(),
                content: system.clone(),
            });
        }
        messages.push(ChatMessage {
            role: "user".to_string(),
            content: request.message.clone(),
        });
        messages
    }

    fn authorize(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => builder.header("Authorization", format!("Bearer {}", key)),
            None => builder,
        }
    }

    /// List model ids exposed by the backend's `/models` endpoint.
    pub async fn list_models(&self) -> Result<Vec<String>, ProviderError> {
        let url = format!("{}/models", self.base_url);
        let response = self
            .authorize(self.client.get(&url))
            .send()
            .await
            .map_err(|e| ProviderError::transport(format!("failed to reach {}: {}", url, e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::provider(format!(
                "model listing failed ({}): {}",
                status, body
            )));
        }

        let listing: ModelListResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::provider(format!("unexpected /models response: {}", e)))?;

        Ok(listing.data.into_iter().map(|m| m.id).collect())
    }
}

#[async_trait]
impl Provider for OpenAiProvider {
    fn name(&self) -> &str {
        "openai"
    }

    fn default_model(&self) -> &str {
        &self.model
    }

    async fn invoke(&self, request: CompletionRequest) -> Result<Completion, ProviderError> {
        let payload = ChatCompletionRequest {
            model: request
                .model
                .clone()
                .unwrap_or_else(|| self.model.clone()),
            messages: Self::build_messages(&request),
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        };

        tracing::debug!(
            provider = "openai",
            model = %payload.model,
            messages = payload.messages.len(),
            "sending chat completion request"
        );

        let url = format!("{}/chat/completions", self.base_url);
        let start = Instant::now();

        let response = self
            .authorize(self.client.post(&url))
            .json(&payload)
            .send()
            .await
            .map_err(|e| ProviderError::transport(format!("failed to reach {}: {}", url, e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!(provider = "openai", status = %status, "chat completion failed");
            return Err(ProviderError::provider(format!(
                "chat completion failed ({}): {}",
                status, body
            )));
        }

        let api_response: ChatCompletionResponse = response.json().await.map_err(|e| {
            ProviderError::provider(format!("unexpected chat completion response: {}", e))
        })?;

        let latency_ms = start.elapsed().as_millis() as u64;
        let text = api_response
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .unwrap_or_default();

        tracing::debug!(provider = "openai", latency_ms, "chat completion received");

        Ok(Completion { text, latency_ms })
    }
}

// ============================================================================
// API TYPES
// ============================================================================

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ModelListResponse {
    #[serde(default)]
    data: Vec<ModelEntry>,
}

#[derive(Debug, Deserialize)]
struct ModelEntry {
    id: String,
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> OpenAiProvider {
        let config = Config {
            base_url: "http://127.0.0.1:1234/v1/".to_string(),
            api_key: None,
            ..Config::default()
        };
        OpenAiProvider::new(&config)
    }

    #[test]
    fn base_url_is_normalized() {
        let p = provider();
        assert_eq!(p.base_url, "http://127.0.0.1:1234/v1");
    }

    #[test]
    fn default_model_comes_from_config_or_fallback() {
        assert_eq!(provider().default_model(), DEFAULT_MODEL);

        let config = Config {
            model: Some("qwen2.5-7b-instruct".to_string()),
            ..Config::default()
        };
        assert_eq!(
            OpenAiProvider::new(&config).default_model(),
            "qwen2.5-7b-instruct"
        );
    }

    #[test]
    fn with_model_overrides() {
        let p = provider().with_model("llama-3.1-8b");
        assert_eq!(p.default_model(), "llama-3.1-8b");
    }

    #[test]
    fn messages_include_system_prompt_when_present() {
        let request = CompletionRequest::new("Hello");
        let messages = OpenAiProvider::build_messages(&request);
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].role, "user");

        let request = CompletionRequest::new("Hello").with_system_prompt("You are terse");
        let messages = OpenAiProvider::build_messages(&request);
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, "system");
        assert_eq!(messages[0].content, "You are terse");
        assert_eq!(messages[1].role, "user");
        assert_eq!(messages[1].content, "Hello");
    }
}

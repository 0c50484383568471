//! # Provider Abstraction Layer
//!
//! Trait and implementations for LLM backends.
//!
//! The run engine never talks to an LLM API directly; it goes through the
//! [`Provider`] trait so the same workflow runs against a real
//! OpenAI-compatible server or against canned responses in tests.
//!
//! | Provider | Use Case | Notes |
//! |----------|----------|-------|
//! | `openai` | Production | Chat Completions against a configurable base URL (local servers included) |
//! | `mock`   | Testing    | Queued responses, request recording, failure simulation |
//!
//! Use [`create_provider`] to instantiate a provider by name.

mod mock;
mod openai;

pub use mock::MockProvider;
pub use openai::OpenAiProvider;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::config::Config;
use crate::error::FlowError;

// ============================================================================
// REQUEST / RESPONSE
// ============================================================================

/// One prompt sent to an LLM backend.
#[derive(Debug, Clone, Default)]
pub struct CompletionRequest {
    /// Model override; falls back to the provider default when absent
    pub model: Option<String>,
    pub system_prompt: Option<String>,
    pub message: String,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

impl CompletionRequest {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Default::default()
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(system_prompt.into());
        self
    }
}

/// Generated text plus how long the backend took to produce it.
#[derive(Debug, Clone)]
pub struct Completion {
    pub text: String,
    pub latency_ms: u64,
}

// ============================================================================
// ERRORS
// ============================================================================

/// Where an invocation failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderErrorKind {
    /// The request never produced a response (connect, DNS, timeout)
    Transport,
    /// The backend answered with an error
    Provider,
}

#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct ProviderError {
    pub kind: ProviderErrorKind,
    pub message: String,
}

impl ProviderError {
    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            kind: ProviderErrorKind::Transport,
            message: message.into(),
        }
    }

    pub fn provider(message: impl Into<String>) -> Self {
        Self {
            kind: ProviderErrorKind::Provider,
            message: message.into(),
        }
    }
}

// ============================================================================
// PROVIDER TRAIT
// ============================================================================

/// Core trait that all LLM backends implement.
///
/// All methods are async to support HTTP-based API providers.
#[async_trait]
pub trait Provider: Send + Sync + std::fmt::Debug {
    /// Provider name (e.g. "openai", "mock")
    fn name(&self) -> &str;

    /// Model used when a request carries none
    fn default_model(&self) -> &str;

    /// Execute a prompt and return the generated text with latency.
    async fn invoke(&self, request: CompletionRequest) -> Result<Completion, ProviderError>;
}

/// Instantiate a provider by name.
pub fn create_provider(name: &str, config: &Config) -> Result<Arc<dyn Provider>, FlowError> {
    match name {
        "openai" => Ok(Arc::new(OpenAiProvider::new(config))),
        "mock" => Ok(Arc::new(MockProvider::new())),
        other => Err(FlowError::Provider(format!(
            "unknown provider '{}' (expected openai or mock)",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_known_providers() {
        let config = Config::default();
        assert_eq!(create_provider("openai", &config).unwrap().name(), "openai");
        assert_eq!(create_provider("mock", &config).unwrap().name(), "mock");
    }

    #[test]
    fn create_unknown_provider_fails() {
        let config = Config::default();
        let err = create_provider("claude-cli", &config).unwrap_err();
        assert!(err.to_string().contains("claude-cli"));
    }

    #[test]
    fn request_builder() {
        let request = CompletionRequest::new("hello")
            .with_model("m1")
            .with_system_prompt("be brief");
        assert_eq!(request.message, "hello");
        assert_eq!(request.model.as_deref(), Some("m1"));
        assert_eq!(request.system_prompt.as_deref(), Some("be brief"));
        assert!(request.max_tokens.is_none());
    }
}

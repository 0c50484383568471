//! Mock provider for testing
//!
//! Returns configurable responses without making real API calls, records
//! every request for assertions, and can simulate backend failures.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::{Completion, CompletionRequest, Provider, ProviderError};

/// Mock provider that returns predefined responses.
#[derive(Debug)]
pub struct MockProvider {
    /// Queue of responses to return (FIFO)
    responses: Arc<Mutex<Vec<String>>>,
    /// Default response when the queue is empty
    default_response: String,
    /// Every request made, in order
    requests: Arc<Mutex<Vec<CompletionRequest>>>,
    /// When set, every invocation fails with this message
    failure: Arc<Mutex<Option<String>>>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(Vec::new())),
            default_response: "Mock response".to_string(),
            requests: Arc::new(Mutex::new(Vec::new())),
            failure: Arc::new(Mutex::new(None)),
        }
    }

    /// Create with a queue of responses
    pub fn with_responses(responses: Vec<String>) -> Self {
        let provider = Self::new();
        *provider.responses.lock().unwrap() = responses;
        provider
    }

    /// Set the default response used when the queue is empty
    pub fn with_default(mut self, response: impl Into<String>) -> Self {
        self.default_response = response.into();
        self
    }

    /// Add a response to the queue
    pub fn queue_response(&self, response: impl Into<String>) {
        self.responses.lock().unwrap().push(response.into());
    }

    /// Make every subsequent invocation fail with this message
    pub fn fail_with(&self, message: impl Into<String>) {
        *self.failure.lock().unwrap() = Some(message.into());
    }

    /// All requests made to this provider
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// The most recent request, if any
    pub fn last_request(&self) -> Option<CompletionRequest> {
        self.requests.lock().unwrap().last().cloned()
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Provider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    fn default_model(&self) -> &str {
        "mock-model"
    }

    async fn invoke(&self, request: CompletionRequest) -> Result<Completion, ProviderError> {
        self.requests.lock().unwrap().push(request);

        if let Some(message) = self.failure.lock().unwrap().clone() {
            return Err(ProviderError::provider(message));
        }

        let text = {
            let mut queue = self.responses.lock().unwrap();
            if queue.is_empty() {
                self.default_response.clone()
            } else {
                queue.remove(0)
            }
        };

        Ok(Completion {
            text,
            latency_ms: 0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn default_response() {
        let provider = MockProvider::new();
        let completion = provider
            .invoke(CompletionRequest::new("Hello"))
            .await
            .unwrap();
        assert_eq!(completion.text, "Mock response");
    }

    #[tokio::test]
    async fn queued_responses_drain_in_order() {
        let provider =
            MockProvider::with_responses(vec!["first".to_string(), "second".to_string()]);

        let one = provider.invoke(CompletionRequest::new("a")).await.unwrap();
        let two = provider.invoke(CompletionRequest::new("b")).await.unwrap();
        let three = provider.invoke(CompletionRequest::new("c")).await.unwrap();

        assert_eq!(one.text, "first");
        assert_eq!(two.text, "second");
        assert_eq!(three.text, "Mock response");
    }

    #[tokio::test]
    async fn records_requests() {
        let provider = MockProvider::new().with_default("ok");
        provider
            .invoke(CompletionRequest::new("first").with_model("m1"))
            .await
            .unwrap();
        provider
            .invoke(CompletionRequest::new("second"))
            .await
            .unwrap();

        let requests = provider.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].message, "first");
        assert_eq!(requests[0].model.as_deref(), Some("m1"));
        assert_eq!(provider.last_request().unwrap().message, "second");
    }

    #[tokio::test]
    async fn simulated_failure() {
        let provider = MockProvider::new();
        provider.fail_with("backend down");

        let err = provider
            .invoke(CompletionRequest::new("Hello"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "backend down");
        // The failed request is still recorded
        assert_eq!(provider.requests().len(), 1);
    }
}

//! Mock tool invoker for testing
//!
//! Returns canned JSON results keyed by tool id and records every
//! invocation for assertions.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{json, Value};

use super::{ToolError, ToolInvoker};

pub struct MockToolInvoker {
    results: Mutex<HashMap<String, Value>>,
    default_result: Value,
    calls: Mutex<Vec<(String, Value)>>,
    failure: Mutex<Option<String>>,
}

impl MockToolInvoker {
    pub fn new() -> Self {
        Self {
            results: Mutex::new(HashMap::new()),
            default_result: json!({"ok": true}),
            calls: Mutex::new(Vec::new()),
            failure: Mutex::new(None),
        }
    }

    /// Set the result returned for a specific tool id
    pub fn with_result(self, tool_id: impl Into<String>, result: Value) -> Self {
        self.results.lock().unwrap().insert(tool_id.into(), result);
        self
    }

    /// Make every subsequent invocation fail with this message
    pub fn fail_with(&self, message: impl Into<String>) {
        *self.failure.lock().unwrap() = Some(message.into());
    }

    /// All invocations made, as (tool_id, payload) pairs
    pub fn calls(&self) -> Vec<(String, Value)> {
        self.calls.lock().unwrap().clone()
    }
}

impl Default for MockToolInvoker {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ToolInvoker for MockToolInvoker {
    async fn invoke(&self, tool_id: &str, payload: &Value) -> Result<Value, ToolError> {
        self.calls
            .lock()
            .unwrap()
            .push((tool_id.to_string(), payload.clone()));

        if let Some(message) = self.failure.lock().unwrap().clone() {
            return Err(ToolError::tool(message));
        }

        let result = self
            .results
            .lock()
            .unwrap()
            .get(tool_id)
            .cloned()
            .unwrap_or_else(|| self.default_result.clone());
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn returns_configured_result_and_records_calls() {
        let invoker = MockToolInvoker::new().with_result("search", json!({"hits": 3}));

        let result = invoker.invoke("search", &json!({"q": "rust"})).await.unwrap();
        assert_eq!(result, json!({"hits": 3}));

        let other = invoker.invoke("unknown", &json!({})).await.unwrap();
        assert_eq!(other, json!({"ok": true}));

        let calls = invoker.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].0, "search");
        assert_eq!(calls[0].1, json!({"q": "rust"}));
    }

    #[tokio::test]
    async fn simulated_failure() {
        let invoker = MockToolInvoker::new();
        invoker.fail_with("endpoint down");

        let err = invoker.invoke("search", &json!({})).await.unwrap_err();
        assert_eq!(err.to_string(), "endpoint down");
        assert_eq!(invoker.calls().len(), 1);
    }
}

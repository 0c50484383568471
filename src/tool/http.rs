//! HTTP tool invoker
//!
//! Resolves tool ids through the tool store, checks the payload against
//! the tool's declared input schema, and POSTs it to the configured
//! endpoint. Tool configs are cached per id so repeated steps in a run do
//! not re-read the store file.

use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::Value;
use tracing::debug;

use super::{ToolConfig, ToolError, ToolInvoker};
use crate::store::ToolStore;

/// Default timeout for tool HTTP requests (30 seconds)
const TOOL_TIMEOUT: Duration = Duration::from_secs(30);

pub struct HttpToolInvoker {
    client: reqwest::Client,
    store: ToolStore,
    /// tool id/name -> resolved config
    cache: DashMap<String, ToolConfig>,
}

impl HttpToolInvoker {
    pub fn new(store: ToolStore) -> Self {
        let client = reqwest::Client::builder()
            .timeout(TOOL_TIMEOUT)
            .connect_timeout(Duration::from_secs(10))
            .redirect(reqwest::redirect::Policy::limited(5))
            .user_agent("flowlab-cli/0.1")
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            store,
            cache: DashMap::new(),
        }
    }

    /// Resolve a tool reference: a numeric id first, then a name.
    fn resolve(&self, tool_id: &str) -> Result<ToolConfig, ToolError> {
        use dashmap::mapref::entry::Entry;

        match self.cache.entry(tool_id.to_string()) {
            Entry::Occupied(e) => Ok(e.get().clone()),
            Entry::Vacant(e) => {
                let config = tool_id
                    .parse::<u64>()
                    .ok()
                    .and_then(|id| self.store.get(id))
                    .or_else(|| self.store.find_by_name(tool_id))
                    .ok_or_else(|| {
                        ToolError::tool(format!("tool '{}' is not registered", tool_id))
                    })?;
                e.insert(config.clone());
                Ok(config)
            }
        }
    }
}

#[async_trait]
impl ToolInvoker for HttpToolInvoker {
    async fn invoke(&self, tool_id: &str, payload: &Value) -> Result<Value, ToolError> {
        let tool = self.resolve(tool_id)?;

        if !tool.enabled {
            return Err(ToolError::tool(format!("tool '{}' is disabled", tool.name)));
        }

        validate_endpoint(&tool.endpoint)
            .map_err(|e| ToolError::tool(format!("tool '{}': {}", tool.name, e)))?;
        validate_input(&tool, payload)?;

        debug!(tool = %tool.name, endpoint = %tool.endpoint, "dispatching tool call");

        let response = self
            .client
            .post(&tool.endpoint)
            .json(payload)
            .send()
            .await
            .map_err(|e| {
                ToolError::transport(format!(
                    "failed to reach tool '{}' at {}: {}",
                    tool.name, tool.endpoint, e
                ))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ToolError::tool(format!(
                "tool '{}' returned {}: {}",
                tool.name, status, body
            )));
        }

        response.json().await.map_err(|e| {
            ToolError::tool(format!(
                "tool '{}' returned a non-JSON response: {}",
                tool.name, e
            ))
        })
    }
}

/// Tool endpoints must be http(s) URLs with a host.
fn validate_endpoint(endpoint: &str) -> Result<(), String> {
    let parsed =
        url::Url::parse(endpoint).map_err(|e| format!("invalid endpoint URL: {}", e))?;

    match parsed.scheme() {
        "http" | "https" => {}
        scheme => {
            return Err(format!(
                "invalid endpoint scheme '{}': only http/https allowed",
                scheme
            ))
        }
    }

    if parsed.host_str().is_none() {
        return Err("endpoint URL has no host".to_string());
    }

    Ok(())
}

/// Check the payload against the tool's declared input schema, if any.
fn validate_input(tool: &ToolConfig, payload: &Value) -> Result<(), ToolError> {
    let schema = &tool.input_schema;
    let unchecked = schema.is_null()
        || schema.as_object().map(|o| o.is_empty()).unwrap_or(false);
    if unchecked {
        return Ok(());
    }

    let compiled = jsonschema::JSONSchema::compile(schema).map_err(|e| {
        ToolError::tool(format!("tool '{}' has an invalid input schema: {}", tool.name, e))
    })?;

    if let Err(errors) = compiled.validate(payload) {
        let details = errors
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ");
        return Err(ToolError::invalid_input(format!(
            "input for tool '{}' does not match its schema: {}",
            tool.name, details
        )));
    }

    Ok(())
}

//! # Tool Invocation Layer
//!
//! Tools are user-registered HTTP endpoints a workflow can call from a
//! `tool` node. The engine only sees the [`ToolInvoker`] trait: give it a
//! tool id and a JSON payload, get a JSON result or a classified error.
//! Endpoint resolution, input-schema checking, and the actual HTTP call
//! live behind the trait.

mod http;
mod mock;

pub use http::HttpToolInvoker;
pub use mock::MockToolInvoker;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// A registered tool: an HTTP endpoint with an optional input schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolConfig {
    /// Assigned by the tool store on create; 0 for unsaved configs
    #[serde(default)]
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// JSON Schema the input payload must satisfy; empty object or null
    /// means unchecked
    #[serde(default)]
    pub input_schema: Value,
    pub endpoint: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

/// Where a tool invocation failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolErrorKind {
    /// The request never produced a response
    Transport,
    /// The tool (or its resolution) failed
    Tool,
    /// The payload did not satisfy the tool's input schema
    InvalidInput,
}

#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct ToolError {
    pub kind: ToolErrorKind,
    pub message: String,
}

impl ToolError {
    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            kind: ToolErrorKind::Transport,
            message: message.into(),
        }
    }

    pub fn tool(message: impl Into<String>) -> Self {
        Self {
            kind: ToolErrorKind::Tool,
            message: message.into(),
        }
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self {
            kind: ToolErrorKind::InvalidInput,
            message: message.into(),
        }
    }
}

/// Dispatch a JSON payload to a tool and return its JSON result.
#[async_trait]
pub trait ToolInvoker: Send + Sync {
    async fn invoke(&self, tool_id: &str, payload: &Value) -> Result<Value, ToolError>;
}

//! Error types with fix suggestions

use thiserror::Error;

/// Trait for errors that provide fix suggestions
pub trait FixSuggestion {
    fn fix_suggestion(&self) -> Option<&str>;
}

/// Top-level error for store, service, and CLI operations.
#[derive(Error, Debug)]
pub enum FlowError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid workflow: {0}")]
    InvalidWorkflow(String),

    #[error("workflow {0} not found")]
    WorkflowNotFound(u64),

    #[error("run {0} not found")]
    RunNotFound(u64),

    #[error("provider error: {0}")]
    Provider(String),

    #[error("tool error: {0}")]
    Tool(String),
}

impl FixSuggestion for FlowError {
    fn fix_suggestion(&self) -> Option<&str> {
        match self {
            FlowError::Json(_) => Some("Check the JSON file for syntax errors (try jq)"),
            FlowError::Io(_) => Some("Check file path and permissions"),
            FlowError::InvalidWorkflow(_) => {
                Some("Run `flowlab validate <file>` for a full report")
            }
            FlowError::WorkflowNotFound(_) => Some("Run `flowlab list` to see stored workflows"),
            FlowError::RunNotFound(_) => Some("Run `flowlab runs` to see recorded runs"),
            FlowError::Provider(_) => Some(
                "Check the LLM server is reachable (FLOWLAB_BASE_URL) and the API key env var is set",
            ),
            FlowError::Tool(_) => {
                Some("Check the tool's endpoint URL and that the tool is enabled")
            }
        }
    }
}

//! Run and step records
//!
//! A run is one end-to-end execution of a workflow against a specific
//! input. It is mutated only while the walk is in progress and becomes an
//! immutable historical record once terminal; earlier successful steps are
//! kept on failure so a failed run can still be inspected step by step.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::workflow::{Node, NodeType, Workflow};

/// Lifecycle state of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Running,
    Completed,
    Failed,
}

/// Outcome of a single step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    Completed,
    Error,
}

/// Stable failure classification carried on failed runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunErrorKind {
    AgentInvocation,
    ToolInput,
    ToolExecution,
    DeadEnd,
    StepLimitExceeded,
}

/// Terminal failure details for a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunError {
    pub kind: RunErrorKind,
    pub message: String,
}

/// Record of one node's execution within a run, in execution order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Step {
    pub node_id: String,
    pub node_type: NodeType,
    #[serde(default)]
    pub node_label: String,
    pub status: StepStatus,
    #[serde(default)]
    pub output: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub latency_ms: u64,
}

impl Step {
    pub fn completed(node: &Node, output: impl Into<String>, latency_ms: u64) -> Self {
        Self {
            node_id: node.id.clone(),
            node_type: node.kind,
            node_label: node.label.clone(),
            status: StepStatus::Completed,
            output: Some(output.into()),
            error: None,
            latency_ms,
        }
    }

    pub fn errored(node: &Node, error: impl Into<String>, latency_ms: u64) -> Self {
        Self {
            node_id: node.id.clone(),
            node_type: node.kind,
            node_label: node.label.clone(),
            status: StepStatus::Error,
            output: None,
            error: Some(error.into()),
            latency_ms,
        }
    }
}

/// A recorded execution of a workflow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Run {
    /// Assigned by the run store on save; 0 until then
    #[serde(default)]
    pub id: u64,
    pub workflow_id: u64,
    pub workflow_name: String,
    pub input_text: String,
    pub status: RunStatus,
    #[serde(default)]
    pub steps: Vec<Step>,
    #[serde(default)]
    pub final_output: Option<String>,
    #[serde(default)]
    pub error: Option<RunError>,
    #[serde(default)]
    pub total_latency_ms: u64,
    pub started_at: DateTime<Utc>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Run {
    /// Create a fresh in-flight run record.
    pub fn started(workflow: &Workflow, input_text: impl Into<String>) -> Self {
        Self {
            id: 0,
            workflow_id: workflow.id,
            workflow_name: workflow.name.clone(),
            input_text: input_text.into(),
            status: RunStatus::Running,
            steps: Vec::new(),
            final_output: None,
            error: None,
            total_latency_ms: 0,
            started_at: Utc::now(),
            completed_at: None,
        }
    }

    /// Mark the run completed with its final output.
    pub fn complete(&mut self, final_output: impl Into<String>) {
        self.final_output = Some(final_output.into());
        self.status = RunStatus::Completed;
        self.finalize();
    }

    /// Mark the run failed with a classified error.
    pub fn fail(&mut self, kind: RunErrorKind, message: impl Into<String>) {
        self.error = Some(RunError {
            kind,
            message: message.into(),
        });
        self.status = RunStatus::Failed;
        self.finalize();
    }

    fn finalize(&mut self) {
        self.total_latency_ms = self.steps.iter().map(|s| s.latency_ms).sum();
        self.completed_at = Some(Utc::now());
    }

    pub fn error_kind(&self) -> Option<RunErrorKind> {
        self.error.as_ref().map(|e| e.kind)
    }
}

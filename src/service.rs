//! Run trigger boundary
//!
//! The [`Orchestrator`] is the surface an outer layer (the CLI here)
//! calls: it loads the stored workflow, seeds the run input from an
//! arbitrary JSON value, executes the engine, and persists the finished
//! run. A structurally invalid workflow is a request-level error; every
//! runtime failure comes back as a normal `failed` run.

use std::sync::Arc;

use serde_json::Value;
use tracing::info;

use crate::config::Config;
use crate::engine::RunEngine;
use crate::error::FlowError;
use crate::executor::NodeExecutor;
use crate::provider::Provider;
use crate::run::Run;
use crate::store::{RunStore, WorkflowStore};
use crate::tool::ToolInvoker;
use crate::validate::{validate, ValidationResult};
use crate::workflow::Workflow;

pub struct Orchestrator {
    workflows: WorkflowStore,
    runs: RunStore,
    engine: RunEngine,
}

impl Orchestrator {
    pub fn new(
        config: &Config,
        provider: Arc<dyn Provider>,
        tools: Arc<dyn ToolInvoker>,
    ) -> Self {
        let executor = NodeExecutor::new(provider, tools);
        Self {
            workflows: WorkflowStore::new(&config.data_dir),
            runs: RunStore::new(&config.data_dir),
            engine: RunEngine::new(executor).with_step_limit(config.step_limit),
        }
    }

    pub fn workflows(&self) -> &WorkflowStore {
        &self.workflows
    }

    pub fn runs(&self) -> &RunStore {
        &self.runs
    }

    /// Validate and store a new workflow definition.
    pub fn import_workflow(&self, workflow: Workflow) -> Result<Workflow, FlowError> {
        let report = validate(&workflow);
        if !report.is_valid() {
            return Err(FlowError::InvalidWorkflow(report.error_summary()));
        }
        self.workflows.create(workflow)
    }

    /// Validate a definition without storing it.
    pub fn check_workflow(&self, workflow: &Workflow) -> ValidationResult {
        validate(workflow)
    }

    /// Execute a stored workflow against an input payload and persist the
    /// run record, completed or failed.
    pub async fn run_workflow(
        &self,
        workflow_id: u64,
        input_data: &Value,
    ) -> Result<Run, FlowError> {
        let workflow = self
            .workflows
            .get(workflow_id)
            .ok_or(FlowError::WorkflowNotFound(workflow_id))?;

        let input = seed_input(input_data);
        info!(workflow = %workflow.name, "run requested");

        let run = self.engine.execute(&workflow, input).await?;
        self.runs.save(run)
    }
}

/// Serialize the run input payload to the string that seeds the context:
/// strings pass through, everything else is JSON-stringified.
fn seed_input(input_data: &Value) -> String {
    match input_data {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

//! JSON file persistence
//!
//! Workflows, tools, and run records live in plain JSON files under the
//! data directory (`workflows.json`, `tools.json`, `workflow_runs.json`).
//! Every operation is a whole-file read-modify-write; ids are assigned on
//! create as max+1. A missing or unreadable file reads as an empty
//! collection and is recreated on the next write.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::FlowError;
use crate::run::Run;
use crate::tool::ToolConfig;
use crate::workflow::Workflow;

fn read_items<T: DeserializeOwned>(path: &Path) -> Vec<T> {
    let Ok(raw) = fs::read_to_string(path) else {
        return Vec::new();
    };
    serde_json::from_str(&raw).unwrap_or_default()
}

fn write_items<T: Serialize>(path: &Path, items: &[T]) -> Result<(), FlowError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, serde_json::to_string_pretty(items)?)?;
    Ok(())
}

fn next_id(ids: impl Iterator<Item = u64>) -> u64 {
    ids.max().unwrap_or(0) + 1
}

// ============================================================================
// WORKFLOWS
// ============================================================================

/// Persistent storage for workflow definitions.
#[derive(Debug, Clone)]
pub struct WorkflowStore {
    path: PathBuf,
}

impl WorkflowStore {
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self {
            path: data_dir.as_ref().join("workflows.json"),
        }
    }

    pub fn list(&self) -> Vec<Workflow> {
        read_items(&self.path)
    }

    pub fn get(&self, id: u64) -> Option<Workflow> {
        self.list().into_iter().find(|w| w.id == id)
    }

    /// Store a new workflow, assigning its id and timestamps.
    pub fn create(&self, mut workflow: Workflow) -> Result<Workflow, FlowError> {
        let mut workflows = self.list();
        workflow.id = next_id(workflows.iter().map(|w| w.id));
        let now = Utc::now();
        workflow.created_at = Some(now);
        workflow.updated_at = Some(now);
        workflows.push(workflow.clone());
        write_items(&self.path, &workflows)?;
        Ok(workflow)
    }

    /// Replace an existing workflow's definition, keeping id and created_at.
    pub fn update(&self, id: u64, mut workflow: Workflow) -> Result<Option<Workflow>, FlowError> {
        let mut workflows = self.list();
        let Some(slot) = workflows.iter_mut().find(|w| w.id == id) else {
            return Ok(None);
        };
        workflow.id = id;
        workflow.created_at = slot.created_at;
        workflow.updated_at = Some(Utc::now());
        *slot = workflow.clone();
        write_items(&self.path, &workflows)?;
        Ok(Some(workflow))
    }

    pub fn delete(&self, id: u64) -> Result<bool, FlowError> {
        let mut workflows = self.list();
        let before = workflows.len();
        workflows.retain(|w| w.id != id);
        if workflows.len() == before {
            return Ok(false);
        }
        write_items(&self.path, &workflows)?;
        Ok(true)
    }
}

// ============================================================================
// RUNS
// ============================================================================

/// Persistent storage for run history.
#[derive(Debug, Clone)]
pub struct RunStore {
    path: PathBuf,
}

impl RunStore {
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self {
            path: data_dir.as_ref().join("workflow_runs.json"),
        }
    }

    pub fn list(&self) -> Vec<Run> {
        read_items(&self.path)
    }

    pub fn list_by_workflow(&self, workflow_id: u64) -> Vec<Run> {
        self.list()
            .into_iter()
            .filter(|r| r.workflow_id == workflow_id)
            .collect()
    }

    pub fn get(&self, id: u64) -> Option<Run> {
        self.list().into_iter().find(|r| r.id == id)
    }

    /// Persist a finished run, assigning its id.
    pub fn save(&self, mut run: Run) -> Result<Run, FlowError> {
        let mut runs = self.list();
        run.id = next_id(runs.iter().map(|r| r.id));
        runs.push(run.clone());
        write_items(&self.path, &runs)?;
        Ok(run)
    }

    pub fn delete(&self, id: u64) -> Result<bool, FlowError> {
        let mut runs = self.list();
        let before = runs.len();
        runs.retain(|r| r.id != id);
        if runs.len() == before {
            return Ok(false);
        }
        write_items(&self.path, &runs)?;
        Ok(true)
    }
}

// ============================================================================
// TOOLS
// ============================================================================

/// Persistent storage for tool configurations.
#[derive(Debug, Clone)]
pub struct ToolStore {
    path: PathBuf,
}

impl ToolStore {
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self {
            path: data_dir.as_ref().join("tools.json"),
        }
    }

    pub fn list(&self) -> Vec<ToolConfig> {
        read_items(&self.path)
    }

    pub fn get(&self, id: u64) -> Option<ToolConfig> {
        self.list().into_iter().find(|t| t.id == id)
    }

    pub fn find_by_name(&self, name: &str) -> Option<ToolConfig> {
        self.list().into_iter().find(|t| t.name == name)
    }

    pub fn create(&self, mut tool: ToolConfig) -> Result<ToolConfig, FlowError> {
        let mut tools = self.list();
        tool.id = next_id(tools.iter().map(|t| t.id));
        tools.push(tool.clone());
        write_items(&self.path, &tools)?;
        Ok(tool)
    }

    pub fn update(&self, id: u64, mut tool: ToolConfig) -> Result<Option<ToolConfig>, FlowError> {
        let mut tools = self.list();
        let Some(slot) = tools.iter_mut().find(|t| t.id == id) else {
            return Ok(None);
        };
        tool.id = id;
        *slot = tool.clone();
        write_items(&self.path, &tools)?;
        Ok(Some(tool))
    }

    pub fn delete(&self, id: u64) -> Result<bool, FlowError> {
        let mut tools = self.list();
        let before = tools.len();
        tools.retain(|t| t.id != id);
        if tools.len() == before {
            return Ok(false);
        }
        write_items(&self.path, &tools)?;
        Ok(true)
    }

    /// Flip a tool's enabled flag.
    pub fn toggle(&self, id: u64) -> Result<Option<ToolConfig>, FlowError> {
        let Some(mut tool) = self.get(id) else {
            return Ok(None);
        };
        tool.enabled = !tool.enabled;
        self.update(id, tool)
    }
}

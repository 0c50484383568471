//! Structural workflow validation
//!
//! Checks a workflow definition before any step executes: node ids must be
//! unique, exactly one start node must exist, and every edge must reference
//! existing nodes. Advisory problems (orphans, unreachable nodes, guards on
//! edges that will never be evaluated) are reported as warnings so existing
//! graphs keep running.

use std::collections::{HashMap, HashSet, VecDeque};

use thiserror::Error;

use crate::workflow::{NodeConfig, NodeType, Workflow};

/// Severity of a validation finding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

/// A single validation finding with context
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("workflow has no nodes")]
    EmptyWorkflow,

    #[error("workflow has no start node")]
    NoStartNode,

    #[error("workflow has {count} start nodes (exactly one required)")]
    MultipleStartNodes { count: usize },

    #[error("duplicate node id '{id}'")]
    DuplicateNodeId { id: String },

    #[error("edge source '{from_node}' does not exist")]
    EdgeSourceNotFound {
        from_node: String,
        available: Vec<String>,
    },

    #[error("edge target '{target}' does not exist")]
    EdgeTargetNotFound {
        target: String,
        available: Vec<String>,
    },

    #[error("tool node '{node_id}' has no tool_id configured")]
    MissingToolId { node_id: String },

    #[error("node '{node_id}' has invalid config: {details}")]
    InvalidNodeConfig { node_id: String, details: String },

    // Advisory findings
    #[error("node '{id}' has no connections")]
    OrphanNode { id: String },

    #[error("node '{id}' is not reachable from the start node")]
    UnreachableNode { id: String },

    #[error("edge '{from_node}' -> '{target}' carries a condition but '{from_node}' is not a condition node")]
    GuardOnNonConditionEdge { from_node: String, target: String },
}

impl ValidationError {
    /// Get severity (error vs warning)
    pub fn severity(&self) -> Severity {
        match self {
            ValidationError::OrphanNode { .. }
            | ValidationError::UnreachableNode { .. }
            | ValidationError::GuardOnNonConditionEdge { .. } => Severity::Warning,
            _ => Severity::Error,
        }
    }

    /// Get suggestion for fixing this finding
    pub fn suggestion(&self) -> Option<String> {
        match self {
            ValidationError::EmptyWorkflow => {
                Some("Add at least a start node and an end node".to_string())
            }
            ValidationError::NoStartNode => {
                Some("Add a node with type 'start' as the entry point".to_string())
            }
            ValidationError::MultipleStartNodes { .. } => {
                Some("Keep one start node and rewire the others".to_string())
            }
            ValidationError::DuplicateNodeId { .. } => {
                Some("Give every node a unique id".to_string())
            }
            ValidationError::EdgeSourceNotFound { available, .. }
            | ValidationError::EdgeTargetNotFound { available, .. } => {
                if available.is_empty() {
                    Some("No nodes available in workflow".to_string())
                } else if available.len() <= 5 {
                    Some(format!("Available nodes: {}", available.join(", ")))
                } else {
                    Some(format!(
                        "Available nodes: {} (and {} more)",
                        available[..3].join(", "),
                        available.len() - 3
                    ))
                }
            }
            ValidationError::MissingToolId { .. } => {
                Some("Set config.tool_id to the id or name of a registered tool".to_string())
            }
            ValidationError::GuardOnNonConditionEdge { .. } => Some(
                "Only edges leaving condition nodes are evaluated; route through a condition node"
                    .to_string(),
            ),
            _ => None,
        }
    }
}

/// Result of validating a workflow definition
#[derive(Debug, Default)]
pub struct ValidationResult {
    pub node_count: usize,
    pub edge_count: usize,
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationError>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn push(&mut self, finding: ValidationError) {
        if finding.severity() == Severity::Warning {
            self.warnings.push(finding);
        } else {
            self.errors.push(finding);
        }
    }

    /// All error messages joined for a one-line summary
    pub fn error_summary(&self) -> String {
        self.errors
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// Validate a workflow definition.
pub fn validate(workflow: &Workflow) -> ValidationResult {
    let mut result = ValidationResult {
        node_count: workflow.nodes.len(),
        edge_count: workflow.edges.len(),
        ..Default::default()
    };

    if workflow.nodes.is_empty() {
        result.push(ValidationError::EmptyWorkflow);
        return result;
    }

    // Unique node ids
    let mut seen: HashSet<&str> = HashSet::new();
    for node in &workflow.nodes {
        if !seen.insert(node.id.as_str()) {
            result.push(ValidationError::DuplicateNodeId {
                id: node.id.clone(),
            });
        }
    }

    // Exactly one start node
    let start_count = workflow
        .nodes
        .iter()
        .filter(|n| n.kind == NodeType::Start)
        .count();
    match start_count {
        0 => result.push(ValidationError::NoStartNode),
        1 => {}
        count => result.push(ValidationError::MultipleStartNodes { count }),
    }

    // Edge endpoints must resolve to existing nodes
    let ids: Vec<String> = workflow.nodes.iter().map(|n| n.id.clone()).collect();
    let id_set: HashSet<&str> = ids.iter().map(String::as_str).collect();
    for edge in &workflow.edges {
        if !id_set.contains(edge.source.as_str()) {
            result.push(ValidationError::EdgeSourceNotFound {
                from_node: edge.source.clone(),
                available: ids.clone(),
            });
        }
        if !id_set.contains(edge.target.as_str()) {
            result.push(ValidationError::EdgeTargetNotFound {
                target: edge.target.clone(),
                available: ids.clone(),
            });
        }
    }

    // Kind-specific config shape
    let mut kinds: HashMap<&str, NodeType> = HashMap::new();
    for node in &workflow.nodes {
        kinds.insert(node.id.as_str(), node.kind);
        if let Err(e) = NodeConfig::from_node(node) {
            result.push(e);
        }
    }

    // Guards only make sense on edges leaving condition nodes
    for edge in &workflow.edges {
        if edge.guard().is_some()
            && kinds.get(edge.source.as_str()).copied() != Some(NodeType::Condition)
            && id_set.contains(edge.source.as_str())
        {
            result.push(ValidationError::GuardOnNonConditionEdge {
                from_node: edge.source.clone(),
                target: edge.target.clone(),
            });
        }
    }

    // Advisory graph checks; only meaningful once the structure is sound
    if result.is_valid() {
        graph_warnings(workflow, &mut result);
    }

    result
}

/// Orphan and reachability warnings (BFS from the start node).
fn graph_warnings(workflow: &Workflow, result: &mut ValidationResult) {
    let mut connected: HashSet<&str> = HashSet::new();
    let mut adjacency: HashMap<&str, Vec<&str>> = HashMap::new();
    for edge in &workflow.edges {
        connected.insert(edge.source.as_str());
        connected.insert(edge.target.as_str());
        adjacency
            .entry(edge.source.as_str())
            .or_default()
            .push(edge.target.as_str());
    }

    if workflow.nodes.len() > 1 {
        for node in &workflow.nodes {
            if !connected.contains(node.id.as_str()) {
                result.push(ValidationError::OrphanNode {
                    id: node.id.clone(),
                });
            }
        }
    }

    let start = workflow
        .nodes
        .iter()
        .find(|n| n.kind == NodeType::Start)
        .map(|n| n.id.as_str());
    let Some(start) = start else { return };

    let mut reachable: HashSet<&str> = HashSet::new();
    let mut queue: VecDeque<&str> = VecDeque::new();
    reachable.insert(start);
    queue.push_back(start);
    while let Some(current) = queue.pop_front() {
        if let Some(neighbors) = adjacency.get(current) {
            for neighbor in neighbors {
                if reachable.insert(neighbor) {
                    queue.push_back(neighbor);
                }
            }
        }
    }

    for node in &workflow.nodes {
        if !reachable.contains(node.id.as_str()) && connected.contains(node.id.as_str()) {
            result.push(ValidationError::UnreachableNode {
                id: node.id.clone(),
            });
        }
    }
}

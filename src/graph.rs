//! Compiled workflow graph
//!
//! [`WorkflowGraph::compile`] validates a definition and builds the lookup
//! structures the run engine walks: node-by-id, typed config per node, and
//! outgoing edges in authored order (the order in the definition's `edges`
//! list decides tie-breaks between matching guards).
//!
//! A graph is a snapshot: compiled once per run, never mutated, so edits to
//! the stored definition cannot affect a run already in progress.

use std::collections::HashMap;

use crate::error::FlowError;
use crate::validate::validate;
use crate::workflow::{Edge, Node, NodeConfig, NodeType, Workflow};

#[derive(Debug)]
pub struct WorkflowGraph {
    nodes: HashMap<String, Node>,
    configs: HashMap<String, NodeConfig>,
    /// source id -> outgoing edges, authored order preserved
    outgoing: HashMap<String, Vec<Edge>>,
    start_id: String,
}

impl WorkflowGraph {
    /// Validate and build the execution snapshot for a workflow.
    ///
    /// Fails with [`FlowError::InvalidWorkflow`] naming every structural
    /// violation; no run state is created in that case.
    pub fn compile(workflow: &Workflow) -> Result<Self, FlowError> {
        let report = validate(workflow);
        if !report.is_valid() {
            return Err(FlowError::InvalidWorkflow(report.error_summary()));
        }

        let capacity = workflow.nodes.len();
        let mut nodes = HashMap::with_capacity(capacity);
        let mut configs = HashMap::with_capacity(capacity);
        let mut outgoing: HashMap<String, Vec<Edge>> = HashMap::with_capacity(capacity);
        let mut start_id = String::new();

        for node in &workflow.nodes {
            // Validation guarantees the config parses and ids are unique
            let config = NodeConfig::from_node(node)
                .map_err(|e| FlowError::InvalidWorkflow(e.to_string()))?;
            if node.kind == NodeType::Start {
                start_id = node.id.clone();
            }
            configs.insert(node.id.clone(), config);
            nodes.insert(node.id.clone(), node.clone());
        }

        for edge in &workflow.edges {
            outgoing
                .entry(edge.source.clone())
                .or_default()
                .push(edge.clone());
        }

        Ok(Self {
            nodes,
            configs,
            outgoing,
            start_id,
        })
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn config(&self, id: &str) -> Option<&NodeConfig> {
        self.configs.get(id)
    }

    /// The unique start node (existence enforced at compile time).
    pub fn start_node(&self) -> &Node {
        &self.nodes[&self.start_id]
    }

    /// Outgoing edges of a node in authored order.
    pub fn outgoing_edges(&self, id: &str) -> &[Edge] {
        static EMPTY: &[Edge] = &[];
        self.outgoing.get(id).map(Vec::as_slice).unwrap_or(EMPTY)
    }
}

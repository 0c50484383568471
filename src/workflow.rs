//! Workflow definition structures
//!
//! A workflow is a directed graph of typed nodes connected by edges.
//! Definitions arrive as JSON (from the store or an imported file) with a
//! permissive per-node `config` object; [`NodeConfig::from_node`] promotes
//! that object into a closed sum type so execution can dispatch
//! exhaustively over node kinds.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::validate::ValidationError;

/// A complete workflow definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workflow {
    /// Assigned by the store on create; 0 for unsaved definitions
    #[serde(default)]
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub edges: Vec<Edge>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// A node in the workflow graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: NodeType,
    #[serde(default)]
    pub label: String,
    /// Kind-specific settings; shape is checked by [`NodeConfig::from_node`]
    #[serde(default)]
    pub config: Value,
    /// Canvas coordinates; irrelevant to execution
    #[serde(default)]
    pub position: Position,
}

/// The five node kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    Start,
    Agent,
    Tool,
    Condition,
    End,
}

impl std::fmt::Display for NodeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NodeType::Start => write!(f, "start"),
            NodeType::Agent => write!(f, "agent"),
            NodeType::Tool => write!(f, "tool"),
            NodeType::Condition => write!(f, "condition"),
            NodeType::End => write!(f, "end"),
        }
    }
}

/// Node position on the editor canvas (presentation only).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
}

/// A directed edge between two nodes, optionally guarded by a
/// `"<op>:<operand>"` condition expression.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Edge {
    #[serde(default)]
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub condition: Option<String>,
}

impl Edge {
    /// The guard expression, if any. Empty and whitespace-only strings
    /// count as unguarded so UI-authored edges with blank conditions
    /// behave as default edges.
    pub fn guard(&self) -> Option<&str> {
        match self.condition.as_deref() {
            Some(expr) if !expr.trim().is_empty() => Some(expr),
            _ => None,
        }
    }
}

// ============================================================================
// TYPED NODE CONFIG
// ============================================================================

/// Default prompt template for agent nodes
pub const DEFAULT_PROMPT_TEMPLATE: &str = "{{input}}";
/// Default input template for tool nodes
pub const DEFAULT_INPUT_TEMPLATE: &str = "{{prev_output}}";

/// Validated, typed view of a node's `config` object.
///
/// Every node kind has a variant here, so the executor's `match` is
/// exhaustive and a new kind cannot be silently skipped.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeConfig {
    Start,
    Agent(AgentNodeConfig),
    Tool(ToolNodeConfig),
    Condition(ConditionNodeConfig),
    End,
}

/// Settings for an `agent` node.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct AgentNodeConfig {
    /// Optional reference to a registered agent preset
    pub agent_id: Option<String>,
    pub model: Option<String>,
    pub system_prompt: Option<String>,
    pub prompt_template: Option<String>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
    /// Extra named variables available to this node's templates
    pub variables: std::collections::HashMap<String, String>,
}

impl AgentNodeConfig {
    pub fn prompt_template(&self) -> &str {
        self.prompt_template.as_deref().unwrap_or(DEFAULT_PROMPT_TEMPLATE)
    }
}

/// Settings for a `tool` node.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolNodeConfig {
    pub tool_id: String,
    pub input_template: Option<String>,
}

impl ToolNodeConfig {
    pub fn input_template(&self) -> &str {
        self.input_template.as_deref().unwrap_or(DEFAULT_INPUT_TEMPLATE)
    }
}

/// Settings for a `condition` node.
///
/// Routing is decided by the guards on the node's outgoing edges; the
/// node-level expression is kept for round-tripping editor documents.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ConditionNodeConfig {
    pub expression: Option<String>,
}

/// Raw wire shape for tool settings (tool_id checked during promotion)
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawToolConfig {
    tool_id: Option<String>,
    input_template: Option<String>,
}

fn parse_config<T>(node: &Node) -> Result<T, ValidationError>
where
    T: serde::de::DeserializeOwned + Default,
{
    if node.config.is_null() {
        return Ok(T::default());
    }
    serde_json::from_value(node.config.clone()).map_err(|e| ValidationError::InvalidNodeConfig {
        node_id: node.id.clone(),
        details: e.to_string(),
    })
}

impl NodeConfig {
    /// Promote a node's raw `config` object into its typed form.
    ///
    /// `start` and `end` nodes accept and ignore any config payload.
    pub fn from_node(node: &Node) -> Result<Self, ValidationError> {
        match node.kind {
            NodeType::Start => Ok(NodeConfig::Start),
            NodeType::End => Ok(NodeConfig::End),
            NodeType::Agent => Ok(NodeConfig::Agent(parse_config(node)?)),
            NodeType::Condition => Ok(NodeConfig::Condition(parse_config(node)?)),
            NodeType::Tool => {
                let raw: RawToolConfig = parse_config(node)?;
                let tool_id = raw
                    .tool_id
                    .filter(|id| !id.trim().is_empty())
                    .ok_or_else(|| ValidationError::MissingToolId {
                        node_id: node.id.clone(),
                    })?;
                Ok(NodeConfig::Tool(ToolNodeConfig {
                    tool_id,
                    input_template: raw.input_template,
                }))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn node(kind: NodeType, config: Value) -> Node {
        Node {
            id: "n1".to_string(),
            kind,
            label: String::new(),
            config,
            position: Position::default(),
        }
    }

    #[test]
    fn parse_minimal_workflow() {
        let workflow: Workflow = serde_json::from_value(json!({
            "name": "demo",
            "nodes": [
                {"id": "s", "type": "start"},
                {"id": "e", "type": "end", "config": {}}
            ],
            "edges": [
                {"source": "s", "target": "e"}
            ]
        }))
        .unwrap();

        assert_eq!(workflow.id, 0);
        assert_eq!(workflow.nodes.len(), 2);
        assert_eq!(workflow.nodes[0].kind, NodeType::Start);
        assert_eq!(workflow.edges[0].source, "s");
        assert!(workflow.edges[0].guard().is_none());
    }

    #[test]
    fn agent_config_defaults() {
        let n = node(NodeType::Agent, Value::Null);
        let config = NodeConfig::from_node(&n).unwrap();
        match config {
            NodeConfig::Agent(agent) => {
                assert_eq!(agent.prompt_template(), "{{input}}");
                assert!(agent.model.is_none());
            }
            other => panic!("expected agent config, got {:?}", other),
        }
    }

    #[test]
    fn tool_config_requires_tool_id() {
        let n = node(NodeType::Tool, json!({"input_template": "{{prev_output}}"}));
        assert!(matches!(
            NodeConfig::from_node(&n),
            Err(ValidationError::MissingToolId { .. })
        ));

        let n = node(NodeType::Tool, json!({"tool_id": "search"}));
        match NodeConfig::from_node(&n).unwrap() {
            NodeConfig::Tool(tool) => {
                assert_eq!(tool.tool_id, "search");
                assert_eq!(tool.input_template(), "{{prev_output}}");
            }
            other => panic!("expected tool config, got {:?}", other),
        }
    }

    #[test]
    fn start_end_ignore_config_payload() {
        let n = node(NodeType::Start, json!({"whatever": 1}));
        assert_eq!(NodeConfig::from_node(&n).unwrap(), NodeConfig::Start);

        let n = node(NodeType::End, json!({}));
        assert_eq!(NodeConfig::from_node(&n).unwrap(), NodeConfig::End);
    }

    #[test]
    fn invalid_config_shape_is_rejected() {
        let n = node(NodeType::Agent, json!({"max_tokens": "not-a-number"}));
        assert!(matches!(
            NodeConfig::from_node(&n),
            Err(ValidationError::InvalidNodeConfig { .. })
        ));
    }

    #[test]
    fn blank_edge_condition_counts_as_unguarded() {
        let edge: Edge = serde_json::from_value(json!({
            "source": "a",
            "target": "b",
            "condition": "  "
        }))
        .unwrap();
        assert!(edge.guard().is_none());

        let edge: Edge = serde_json::from_value(json!({
            "source": "a",
            "target": "b",
            "condition": "contains:yes"
        }))
        .unwrap();
        assert_eq!(edge.guard(), Some("contains:yes"));
    }
}

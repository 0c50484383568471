//! Node execution
//!
//! Produces the output (or classified error) of a single node given its
//! typed config and the current execution context. `agent` and `tool`
//! nodes are the only ones with side effects (one network call each);
//! everything else is pure context plumbing.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, instrument};

use crate::agent::AgentRegistry;
use crate::context::ExecutionContext;
use crate::provider::{CompletionRequest, Provider};
use crate::run::RunErrorKind;
use crate::template;
use crate::tool::{ToolErrorKind, ToolInvoker};
use crate::workflow::{AgentNodeConfig, Node, NodeConfig, ToolNodeConfig};

/// A single node's execution failure, classified for the run record.
#[derive(Debug, Clone, Error)]
pub enum StepError {
    #[error("agent invocation failed: {0}")]
    AgentInvocation(String),

    #[error("tool input is not valid JSON: {0}")]
    ToolInput(String),

    #[error("tool execution failed: {0}")]
    ToolExecution(String),
}

impl StepError {
    pub fn kind(&self) -> RunErrorKind {
        match self {
            StepError::AgentInvocation(_) => RunErrorKind::AgentInvocation,
            StepError::ToolInput(_) => RunErrorKind::ToolInput,
            StepError::ToolExecution(_) => RunErrorKind::ToolExecution,
        }
    }
}

/// Executes one node at a time against the LLM and tool services.
pub struct NodeExecutor {
    provider: Arc<dyn Provider>,
    tools: Arc<dyn ToolInvoker>,
    agents: AgentRegistry,
}

impl NodeExecutor {
    pub fn new(provider: Arc<dyn Provider>, tools: Arc<dyn ToolInvoker>) -> Self {
        Self {
            provider,
            tools,
            agents: AgentRegistry::with_builtins(),
        }
    }

    pub fn with_agents(mut self, agents: AgentRegistry) -> Self {
        self.agents = agents;
        self
    }

    /// Execute a node and return its output string.
    ///
    /// `start` emits the run input, `end` and `condition` pass the
    /// previous output through (condition routing happens in the engine,
    /// against the guards on the node's outgoing edges).
    #[instrument(skip_all, fields(node = %node.id, kind = %node.kind))]
    pub async fn execute(
        &self,
        node: &Node,
        config: &NodeConfig,
        ctx: &ExecutionContext,
    ) -> Result<String, StepError> {
        match config {
            NodeConfig::Start => Ok(ctx.input().to_string()),
            NodeConfig::End => Ok(ctx.prev_output().to_string()),
            NodeConfig::Condition(_) => Ok(ctx.prev_output().to_string()),
            NodeConfig::Agent(agent) => self.execute_agent(agent, ctx).await,
            NodeConfig::Tool(tool) => self.execute_tool(tool, ctx).await,
        }
    }

    async fn execute_agent(
        &self,
        config: &AgentNodeConfig,
        ctx: &ExecutionContext,
    ) -> Result<String, StepError> {
        let prompt = if config.variables.is_empty() {
            template::render(config.prompt_template(), ctx)
        } else {
            // Node-specific variables extend the run context for this
            // render only
            let mut scoped = ctx.clone();
            for (name, value) in &config.variables {
                scoped.set_var(name, value);
            }
            template::render(config.prompt_template(), &scoped)
        };

        // Inline settings win over the referenced preset
        let preset = config
            .agent_id
            .as_deref()
            .and_then(|id| self.agents.get(id));
        let request = CompletionRequest {
            model: config
                .model
                .clone()
                .or_else(|| preset.and_then(|a| a.model.clone())),
            system_prompt: config
                .system_prompt
                .clone()
                .or_else(|| preset.and_then(|a| a.system_prompt.clone())),
            message: prompt,
            max_tokens: config.max_tokens.or_else(|| preset.and_then(|a| a.max_tokens)),
            temperature: config
                .temperature
                .or_else(|| preset.and_then(|a| a.temperature)),
        };

        let completion = self
            .provider
            .invoke(request)
            .await
            .map_err(|e| StepError::AgentInvocation(e.to_string()))?;

        debug!(latency_ms = completion.latency_ms, "agent node completed");
        Ok(completion.text)
    }

    async fn execute_tool(
        &self,
        config: &ToolNodeConfig,
        ctx: &ExecutionContext,
    ) -> Result<String, StepError> {
        let rendered = template::render(config.input_template(), ctx);
        let payload: serde_json::Value =
            serde_json::from_str(&rendered).map_err(|e| StepError::ToolInput(e.to_string()))?;

        let result = self
            .tools
            .invoke(&config.tool_id, &payload)
            .await
            .map_err(|e| match e.kind {
                ToolErrorKind::InvalidInput => StepError::ToolInput(e.message),
                _ => StepError::ToolExecution(e.message),
            })?;

        Ok(result.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::MockProvider;
    use crate::tool::MockToolInvoker;
    use crate::workflow::{NodeType, Position};
    use serde_json::json;

    fn node(kind: NodeType) -> Node {
        Node {
            id: "n1".to_string(),
            kind,
            label: String::new(),
            config: serde_json::Value::Null,
            position: Position::default(),
        }
    }

    fn executor(provider: Arc<MockProvider>, tools: Arc<MockToolInvoker>) -> NodeExecutor {
        NodeExecutor::new(provider, tools)
    }

    #[tokio::test]
    async fn start_emits_run_input() {
        let exec = executor(Arc::new(MockProvider::new()), Arc::new(MockToolInvoker::new()));
        let mut ctx = ExecutionContext::new("seed");
        ctx.set_prev_output("later");

        let out = exec
            .execute(&node(NodeType::Start), &NodeConfig::Start, &ctx)
            .await
            .unwrap();
        assert_eq!(out, "seed");
    }

    #[tokio::test]
    async fn end_and_condition_pass_previous_output_through() {
        let exec = executor(Arc::new(MockProvider::new()), Arc::new(MockToolInvoker::new()));
        let mut ctx = ExecutionContext::new("seed");
        ctx.set_prev_output("carried");

        let out = exec
            .execute(&node(NodeType::End), &NodeConfig::End, &ctx)
            .await
            .unwrap();
        assert_eq!(out, "carried");

        let out = exec
            .execute(
                &node(NodeType::Condition),
                &NodeConfig::Condition(Default::default()),
                &ctx,
            )
            .await
            .unwrap();
        assert_eq!(out, "carried");
    }

    #[tokio::test]
    async fn agent_renders_template_and_calls_provider() {
        let provider = Arc::new(MockProvider::new().with_default("generated"));
        let exec = executor(provider.clone(), Arc::new(MockToolInvoker::new()));

        let config = AgentNodeConfig {
            prompt_template: Some("Q: {{input}}".to_string()),
            system_prompt: Some("be brief".to_string()),
            model: Some("m1".to_string()),
            ..Default::default()
        };
        let ctx = ExecutionContext::new("2+2");

        let out = exec
            .execute(&node(NodeType::Agent), &NodeConfig::Agent(config), &ctx)
            .await
            .unwrap();
        assert_eq!(out, "generated");

        let request = provider.last_request().unwrap();
        assert_eq!(request.message, "Q: 2+2");
        assert_eq!(request.system_prompt.as_deref(), Some("be brief"));
        assert_eq!(request.model.as_deref(), Some("m1"));
    }

    #[tokio::test]
    async fn agent_node_variables_extend_the_render_context() {
        let provider = Arc::new(MockProvider::new());
        let exec = executor(provider.clone(), Arc::new(MockToolInvoker::new()));

        let config = AgentNodeConfig {
            prompt_template: Some("{{tone}} answer to {{input}}".to_string()),
            variables: [("tone".to_string(), "formal".to_string())].into(),
            ..Default::default()
        };

        exec.execute(
            &node(NodeType::Agent),
            &NodeConfig::Agent(config),
            &ExecutionContext::new("2+2"),
        )
        .await
        .unwrap();

        assert_eq!(
            provider.last_request().unwrap().message,
            "formal answer to 2+2"
        );
    }

    #[tokio::test]
    async fn agent_preset_fills_missing_settings() {
        let provider = Arc::new(MockProvider::new());
        let exec = executor(provider.clone(), Arc::new(MockToolInvoker::new()));

        let config = AgentNodeConfig {
            agent_id: Some("summarizer".to_string()),
            ..Default::default()
        };
        let ctx = ExecutionContext::new("long text");

        exec.execute(&node(NodeType::Agent), &NodeConfig::Agent(config), &ctx)
            .await
            .unwrap();

        let request = provider.last_request().unwrap();
        assert!(request
            .system_prompt
            .as_deref()
            .unwrap()
            .contains("Summarize"));
        assert_eq!(request.max_tokens, Some(256));
    }

    #[tokio::test]
    async fn agent_inline_settings_override_preset() {
        let provider = Arc::new(MockProvider::new());
        let exec = executor(provider.clone(), Arc::new(MockToolInvoker::new()));

        let config = AgentNodeConfig {
            agent_id: Some("summarizer".to_string()),
            system_prompt: Some("inline wins".to_string()),
            ..Default::default()
        };

        exec.execute(
            &node(NodeType::Agent),
            &NodeConfig::Agent(config),
            &ExecutionContext::new("x"),
        )
        .await
        .unwrap();

        let request = provider.last_request().unwrap();
        assert_eq!(request.system_prompt.as_deref(), Some("inline wins"));
    }

    #[tokio::test]
    async fn agent_provider_failure_is_classified() {
        let provider = Arc::new(MockProvider::new());
        provider.fail_with("server unreachable");
        let exec = executor(provider, Arc::new(MockToolInvoker::new()));

        let err = exec
            .execute(
                &node(NodeType::Agent),
                &NodeConfig::Agent(Default::default()),
                &ExecutionContext::new("x"),
            )
            .await
            .unwrap_err();

        assert_eq!(err.kind(), RunErrorKind::AgentInvocation);
        assert!(err.to_string().contains("server unreachable"));
    }

    #[tokio::test]
    async fn tool_renders_payload_and_stringifies_result() {
        let tools = Arc::new(MockToolInvoker::new().with_result("search", json!({"hits": 2})));
        let exec = executor(Arc::new(MockProvider::new()), tools.clone());

        let config = ToolNodeConfig {
            tool_id: "search".to_string(),
            input_template: Some(r#"{"query": "{{prev_output}}"}"#.to_string()),
        };
        let mut ctx = ExecutionContext::new("x");
        ctx.set_prev_output("rust workflows");

        let out = exec
            .execute(&node(NodeType::Tool), &NodeConfig::Tool(config), &ctx)
            .await
            .unwrap();
        assert_eq!(out, json!({"hits": 2}).to_string());

        let calls = tools.calls();
        assert_eq!(calls[0].1, json!({"query": "rust workflows"}));
    }

    #[tokio::test]
    async fn tool_rejects_non_json_input() {
        let exec = executor(Arc::new(MockProvider::new()), Arc::new(MockToolInvoker::new()));
        let config = ToolNodeConfig {
            tool_id: "search".to_string(),
            input_template: Some("not json at all".to_string()),
        };

        let err = exec
            .execute(
                &node(NodeType::Tool),
                &NodeConfig::Tool(config),
                &ExecutionContext::new("x"),
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind(), RunErrorKind::ToolInput);
    }

    #[tokio::test]
    async fn tool_failure_is_classified() {
        let tools = Arc::new(MockToolInvoker::new());
        tools.fail_with("endpoint 500");
        let exec = executor(Arc::new(MockProvider::new()), tools);

        let config = ToolNodeConfig {
            tool_id: "search".to_string(),
            input_template: Some("{}".to_string()),
        };

        let err = exec
            .execute(
                &node(NodeType::Tool),
                &NodeConfig::Tool(config),
                &ExecutionContext::new("x"),
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind(), RunErrorKind::ToolExecution);
    }
}

//! Agent presets
//!
//! An agent preset bundles a model, a system prompt, and sampling
//! settings under a stable id, so `agent` nodes can reference a persona
//! instead of repeating its configuration. Inline node settings always
//! override the preset.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A named agent configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub system_prompt: Option<String>,
    #[serde(default)]
    pub max_tokens: Option<u32>,
    #[serde(default)]
    pub temperature: Option<f32>,
}

/// Lookup table of agent presets.
#[derive(Debug, Clone, Default)]
pub struct AgentRegistry {
    agents: HashMap<String, AgentConfig>,
}

impl AgentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry seeded with the built-in presets.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.insert(AgentConfig {
            id: "general-assistant".to_string(),
            name: "General Assistant".to_string(),
            model: None,
            system_prompt: Some("You are a helpful, concise assistant.".to_string()),
            max_tokens: Some(256),
            temperature: Some(0.7),
        });
        registry.insert(AgentConfig {
            id: "summarizer".to_string(),
            name: "Summarizer".to_string(),
            model: None,
            system_prompt: Some(
                "Summarize the given text in a few sentences, keeping the key facts.".to_string(),
            ),
            max_tokens: Some(256),
            temperature: Some(0.4),
        });
        registry
    }

    pub fn insert(&mut self, agent: AgentConfig) {
        self.agents.insert(agent.id.clone(), agent);
    }

    pub fn get(&self, id: &str) -> Option<&AgentConfig> {
        self.agents.get(id)
    }

    pub fn list(&self) -> Vec<&AgentConfig> {
        let mut agents: Vec<&AgentConfig> = self.agents.values().collect();
        agents.sort_by(|a, b| a.id.cmp(&b.id));
        agents
    }
}

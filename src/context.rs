//! Per-run execution context
//!
//! Holds the state threaded through node execution: the original run input
//! (fixed for the run's lifetime), the output of the most recently executed
//! node, and any extra named variables. One context exists per run and is
//! discarded when the run finishes.

use std::collections::HashMap;

/// Mutable state for a single workflow run.
#[derive(Debug, Clone, Default)]
pub struct ExecutionContext {
    input: String,
    prev_output: String,
    vars: HashMap<String, String>,
}

impl ExecutionContext {
    /// Create a context seeded with the run input.
    ///
    /// `prev_output` starts equal to the input so the first template
    /// rendered in the run has something to reference.
    pub fn new(input: impl Into<String>) -> Self {
        let input = input.into();
        Self {
            prev_output: input.clone(),
            input,
            vars: HashMap::new(),
        }
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn prev_output(&self) -> &str {
        &self.prev_output
    }

    pub fn set_prev_output(&mut self, output: impl Into<String>) {
        self.prev_output = output.into();
    }

    /// Set an extra named variable for template rendering.
    pub fn set_var(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(name.into(), value.into());
    }

    /// Resolve a template variable name. `input` and `prev_output` are
    /// built in; anything else comes from the extra variables.
    pub fn lookup(&self, name: &str) -> Option<&str> {
        match name {
            "input" => Some(&self.input),
            "prev_output" => Some(&self.prev_output),
            _ => self.vars.get(name).map(String::as_str),
        }
    }
}

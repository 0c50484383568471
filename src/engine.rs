//! Run engine
//!
//! Walks a compiled workflow graph from its start node, one step at a
//! time: execute the current node, record a step, route along the
//! outgoing edges, stop on an end node, a failure, a dead end, or the
//! step budget. Runs are strictly sequential (a single path is live at
//! any moment) and fully independent of each other.

use std::time::Instant;

use tracing::{debug, info, warn};

use crate::condition;
use crate::context::ExecutionContext;
use crate::error::FlowError;
use crate::executor::NodeExecutor;
use crate::graph::WorkflowGraph;
use crate::run::{Run, RunErrorKind, Step};
use crate::workflow::{Edge, Node, NodeConfig, Workflow};

/// Default step budget; generous for real workflows, small enough to cut
/// cyclic graphs short quickly.
pub const DEFAULT_STEP_LIMIT: usize = 100;

/// Executes workflows step by step against a compiled graph snapshot.
pub struct RunEngine {
    executor: NodeExecutor,
    step_limit: usize,
}

impl RunEngine {
    pub fn new(executor: NodeExecutor) -> Self {
        Self {
            executor,
            step_limit: DEFAULT_STEP_LIMIT,
        }
    }

    /// Override the step budget (cyclic graphs are legal; this is the
    /// only thing that stops a loop that never reaches an end node).
    pub fn with_step_limit(mut self, step_limit: usize) -> Self {
        self.step_limit = step_limit;
        self
    }

    /// Execute a workflow against an input.
    ///
    /// A structurally invalid workflow fails before any step executes and
    /// is returned as an error. Every runtime failure is terminal and
    /// comes back as a `failed` run with the failing step recorded last.
    pub async fn execute(
        &self,
        workflow: &Workflow,
        input: impl Into<String>,
    ) -> Result<Run, FlowError> {
        let graph = WorkflowGraph::compile(workflow)?;
        let input = input.into();

        info!(workflow = %workflow.name, step_limit = self.step_limit, "starting run");

        let mut ctx = ExecutionContext::new(input.clone());
        let mut run = Run::started(workflow, input);
        let mut current = graph.start_node();

        for _ in 0..self.step_limit {
            let config = graph
                .config(&current.id)
                .expect("compiled graph has a config for every node");

            debug!(node = %current.id, kind = %current.kind, "executing step");
            let step_start = Instant::now();
            let outcome = self.executor.execute(current, config, &ctx).await;
            let latency_ms = step_start.elapsed().as_millis() as u64;

            match outcome {
                Err(e) => {
                    warn!(node = %current.id, error = %e, "step failed, run aborted");
                    run.steps.push(Step::errored(current, e.to_string(), latency_ms));
                    run.fail(e.kind(), e.to_string());
                    return Ok(run);
                }
                Ok(output) => {
                    run.steps.push(Step::completed(current, &output, latency_ms));

                    // Condition nodes leave prev_output untouched
                    if !matches!(config, NodeConfig::Condition(_)) {
                        ctx.set_prev_output(output);
                    }

                    if matches!(config, NodeConfig::End) {
                        run.complete(ctx.prev_output());
                        info!(steps = run.steps.len(), "run completed");
                        return Ok(run);
                    }

                    match self.next_node(&graph, current, config, &ctx) {
                        Some(next) => current = next,
                        None => {
                            let message = format!(
                                "node '{}' is not an end node and has no edge to follow",
                                current.id
                            );
                            warn!(node = %current.id, "dead end, run aborted");
                            run.fail(RunErrorKind::DeadEnd, message);
                            return Ok(run);
                        }
                    }
                }
            }
        }

        run.fail(
            RunErrorKind::StepLimitExceeded,
            format!("run exceeded the step budget of {}", self.step_limit),
        );
        Ok(run)
    }

    /// Pick the next node along the current node's outgoing edges.
    ///
    /// Condition nodes evaluate each guarded edge in authored order
    /// against the previous output and take the first match, falling back
    /// to the first unguarded (default) edge. Every other kind follows
    /// its first edge; guards on such edges are never evaluated.
    fn next_node<'g>(
        &self,
        graph: &'g WorkflowGraph,
        current: &Node,
        config: &NodeConfig,
        ctx: &ExecutionContext,
    ) -> Option<&'g Node> {
        let edges = graph.outgoing_edges(&current.id);
        let chosen: &Edge = if matches!(config, NodeConfig::Condition(_)) {
            edges
                .iter()
                .find(|e| {
                    e.guard()
                        .map(|expr| condition::evaluate(expr, ctx.prev_output()))
                        .unwrap_or(false)
                })
                .or_else(|| edges.iter().find(|e| e.guard().is_none()))?
        } else {
            edges.first()?
        };

        debug!(from = %current.id, to = %chosen.target, "edge taken");
        graph.node(&chosen.target)
    }
}

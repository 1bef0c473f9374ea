//! Graph traversal and node dispatch.
//!
//! `WorkflowExecutor` walks the definition depth-first from every trigger
//! node, threading each node's output forward as the next node's input:
//! 1. Validates the definition (trigger present, no dangling edges).
//! 2. Traverses each trigger's chain in definition order.
//! 3. Memoizes per-node results in a visited cache, so convergent paths
//!    (diamond shapes) execute a node's side effects at most once.
//! 4. Short-circuits a path when a condition doesn't pass, without
//!    touching sibling branches.
//! 5. Aborts the entire run on the first node error.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, instrument};

use nodes::{ActionRegistry, NodeError};

use crate::models::{Node, NodeKind, WorkflowDefinition};
use crate::validate::validate_definition;
use crate::EngineError;

// ---------------------------------------------------------------------------
// NodeRun
// ---------------------------------------------------------------------------

/// One entry in a run's ordered execution trace.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeRun {
    pub node_id: String,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    pub output: Value,
}

// ---------------------------------------------------------------------------
// TraversalOutcome
// ---------------------------------------------------------------------------

/// What a traversal produced: the ordered trace of every node that ran,
/// plus the error that stopped the run (if one did).
///
/// The trace is kept even when the run fails, so callers can see how far
/// it got before the error.
#[derive(Debug)]
pub struct TraversalOutcome {
    pub results: Vec<NodeRun>,
    pub error: Option<EngineError>,
}

// ---------------------------------------------------------------------------
// Per-run traversal state
// ---------------------------------------------------------------------------

/// Ephemeral state owned by exactly one run, never shared across runs.
struct TraversalState {
    /// node id → already-computed output.  Shared across paths for
    /// side-effect dedup; a cache hit ends the revisiting path there.
    visited: HashMap<String, Value>,
    /// Ordered trace of every node executed in this run.
    results: Vec<NodeRun>,
}

// ---------------------------------------------------------------------------
// WorkflowExecutor
// ---------------------------------------------------------------------------

/// Stateless traversal engine; all per-run state lives on the stack of
/// [`WorkflowExecutor::run`].
pub struct WorkflowExecutor {
    actions: ActionRegistry,
}

impl WorkflowExecutor {
    pub fn new(actions: ActionRegistry) -> Self {
        Self { actions }
    }

    /// Walk the whole graph and return the ordered execution trace.
    ///
    /// Definition errors surface before any node runs; a node error aborts
    /// the run with the offending node's id attached.  Either way the
    /// outcome carries whatever trace had accumulated by then.
    #[instrument(skip_all, fields(nodes = definition.nodes.len()))]
    pub async fn run(&self, definition: &WorkflowDefinition, input: Value) -> TraversalOutcome {
        if let Err(err) = validate_definition(definition) {
            return TraversalOutcome {
                results: Vec::new(),
                error: Some(err),
            };
        }

        let mut state = TraversalState {
            visited: HashMap::new(),
            results: Vec::new(),
        };

        for trigger in definition.trigger_nodes() {
            if let Err(err) = self
                .walk(definition, trigger, input.clone(), &mut state)
                .await
            {
                return TraversalOutcome {
                    results: state.results,
                    error: Some(err),
                };
            }
        }

        info!("traversal finished after {} node executions", state.results.len());
        TraversalOutcome {
            results: state.results,
            error: None,
        }
    }

    /// Depth-first walk from one node, carrying this path's data.
    ///
    /// Boxed because the future recurses through itself.
    fn walk<'a>(
        &'a self,
        definition: &'a WorkflowDefinition,
        node: &'a Node,
        input: Value,
        state: &'a mut TraversalState,
    ) -> Pin<Box<dyn Future<Output = Result<(), EngineError>> + Send + 'a>> {
        Box::pin(async move {
            // Revisit via a converging path: the cached result stands and
            // the node's subtree is not walked again.
            if state.visited.contains_key(&node.id) {
                debug!("node '{}' already executed in this run, skipping", node.id);
                return Ok(());
            }

            let output = self
                .execute_node(node, &input)
                .await
                .map_err(|source| EngineError::Node {
                    node_id: node.id.clone(),
                    source,
                })?;

            state.visited.insert(node.id.clone(), output.clone());
            state.results.push(NodeRun {
                node_id: node.id.clone(),
                kind: node.kind.clone(),
                output: output.clone(),
            });

            // A failed condition prunes this path only; sibling branches
            // keep running.
            if node.kind == NodeKind::Condition {
                let passed = output
                    .get("passed")
                    .and_then(Value::as_bool)
                    .unwrap_or(false);
                if !passed {
                    debug!("condition '{}' did not pass, pruning this path", node.id);
                    return Ok(());
                }
            }

            for edge in definition.edges_from(&node.id) {
                // Validation guarantees the target exists.
                if let Some(next) = definition.node(&edge.target) {
                    self.walk(definition, next, output.clone(), &mut *state).await?;
                }
            }

            Ok(())
        })
    }

    /// Dispatch a single node on its kind.
    ///
    /// Triggers and unrecognised kinds are identity; errors from the
    /// delegated operations propagate untouched.
    async fn execute_node(&self, node: &Node, input: &Value) -> Result<Value, NodeError> {
        debug!("executing node '{}' ({})", node.id, node.kind);

        match &node.kind {
            NodeKind::Trigger => Ok(input.clone()),
            NodeKind::Condition => Ok(Value::from(nodes::condition::evaluate(&node.data, input))),
            NodeKind::Action => self.actions.dispatch(&node.data, input).await,
            NodeKind::Delay => Ok(nodes::delay::wait(&node.data, input).await),
            NodeKind::Other(_) => Ok(input.clone()),
        }
    }
}

//! Definition validation — run this before persisting or executing a
//! workflow.
//!
//! Rules enforced:
//! 1. Every edge must reference existing node ids (both `source` and
//!    `target`).
//! 2. At least one node of kind `trigger` must exist.
//!
//! Cycles are deliberately NOT rejected: traversal memoizes per-node
//! results, so a back-edge terminates at the visited cache instead of
//! looping.

use std::collections::HashSet;

use crate::models::WorkflowDefinition;
use crate::EngineError;

/// Validate the definition's structural invariants.
///
/// # Errors
/// - [`EngineError::UnknownNodeReference`] if an edge dangles.
/// - [`EngineError::NoTriggerNode`] if there is no entry point.
pub fn validate_definition(definition: &WorkflowDefinition) -> Result<(), EngineError> {
    let node_ids: HashSet<&str> = definition.nodes.iter().map(|n| n.id.as_str()).collect();

    for edge in &definition.edges {
        if !node_ids.contains(edge.source.as_str()) {
            return Err(EngineError::UnknownNodeReference {
                edge_id: edge.id.clone(),
                node_id: edge.source.clone(),
                side: "source",
            });
        }
        if !node_ids.contains(edge.target.as_str()) {
            return Err(EngineError::UnknownNodeReference {
                edge_id: edge.id.clone(),
                node_id: edge.target.clone(),
                side: "target",
            });
        }
    }

    if definition.trigger_nodes().next().is_none() {
        return Err(EngineError::NoTriggerNode);
    }

    Ok(())
}

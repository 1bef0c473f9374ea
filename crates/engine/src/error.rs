//! Engine-level error types.

use thiserror::Error;
use uuid::Uuid;

/// Errors produced by the workflow engine (validation + execution).
#[derive(Debug, Error)]
pub enum EngineError {
    // ------ Definition errors ------

    /// The definition has no entry point to start traversal from.
    #[error("workflow has no trigger node")]
    NoTriggerNode,

    /// An edge references a node id that doesn't exist in the workflow.
    #[error("edge '{edge_id}' references unknown node '{node_id}' ({side} side)")]
    UnknownNodeReference {
        edge_id: String,
        node_id: String,
        side: &'static str,
    },

    /// The stored definition is not valid workflow JSON.
    #[error("malformed workflow definition: {0}")]
    MalformedDefinition(String),

    /// No workflow row exists for the requested id.
    #[error("workflow '{0}' not found")]
    WorkflowNotFound(String),

    /// No execution record exists for the requested id.
    #[error("execution '{0}' not found")]
    ExecutionNotFound(Uuid),

    // ------ Execution errors ------

    /// A node's delegated operation failed; the whole run is aborted.
    #[error("node '{node_id}' failed: {source}")]
    Node {
        node_id: String,
        #[source]
        source: nodes::NodeError,
    },

    /// Persistence error from the record store.
    #[error("store error: {0}")]
    Store(#[from] store::StoreError),

    /// A record failed to (de)serialise on its way to or from the store.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

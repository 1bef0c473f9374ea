//! `engine` crate — core domain models, definition validation, graph
//! traversal, and the execution-record lifecycle.

pub mod error;
pub mod executor;
pub mod models;
pub mod runner;
pub mod validate;

pub use error::EngineError;
pub use executor::{NodeRun, TraversalOutcome, WorkflowExecutor};
pub use models::{Edge, ExecutionRecord, ExecutionStatus, Node, NodeKind, WorkflowDefinition};
pub use runner::{ExecutionRunner, RecordHandle, RunOutcome, RunReport};
pub use validate::validate_definition;

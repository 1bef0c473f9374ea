//! `nodes` crate — the building blocks a workflow node dispatches to.
//!
//! Conditions and delays are plain functions; actions go through the
//! [`ActionRegistry`], a string-keyed map of [`ActionHandler`]
//! implementations.  The engine crate owns node-type dispatch and graph
//! traversal; this crate owns what each node *does*.

pub mod actions;
pub mod condition;
pub mod delay;
pub mod error;
pub mod mock;
pub mod traits;

pub use actions::ActionRegistry;
pub use condition::{evaluate, ConditionOutcome};
pub use error::NodeError;
pub use traits::ActionHandler;

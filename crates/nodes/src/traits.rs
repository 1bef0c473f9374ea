//! The `ActionHandler` trait — the contract every action must fulfil.

use async_trait::async_trait;
use serde_json::Value;

use crate::NodeError;

/// A named, side-effecting operation an `action` node can dispatch to.
///
/// `config` is the node's `data` mapping (it carries `actionType` plus
/// whatever parameters the handler needs); `input` is the data carried
/// along the path that reached the node.  The returned JSON becomes the
/// input of every downstream node on this path.
#[async_trait]
pub trait ActionHandler: Send + Sync {
    async fn execute(&self, config: &Value, input: &Value) -> Result<Value, NodeError>;
}

//! `MockHandler` — a test double for `ActionHandler`.
//!
//! Records every call it receives, so traversal tests can assert how many
//! times an action actually ran (e.g. the diamond-dedup guarantee).

use async_trait::async_trait;
use serde_json::Value;
use std::sync::{Arc, Mutex};

use crate::{ActionHandler, NodeError};

/// Behaviour injected into `MockHandler` at construction time.
pub enum MockBehaviour {
    /// Return a specific JSON value.
    ReturnValue(Value),
    /// Fail with a `BadConfig` error (any node error aborts the run).
    Fail(String),
}

/// A mock action handler that records every input it sees.
pub struct MockHandler {
    /// Behaviour when `execute` is called.
    pub behaviour: MockBehaviour,
    /// All inputs seen by this handler (in call order).
    pub calls: Arc<Mutex<Vec<Value>>>,
}

impl MockHandler {
    /// A handler that always succeeds with the given value.
    pub fn returning(value: Value) -> Self {
        Self {
            behaviour: MockBehaviour::ReturnValue(value),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// A handler that always fails.
    pub fn failing(msg: impl Into<String>) -> Self {
        Self {
            behaviour: MockBehaviour::Fail(msg.into()),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Shared view of the call log, for asserting after the handler has
    /// been moved into a registry.
    pub fn call_log(&self) -> Arc<Mutex<Vec<Value>>> {
        Arc::clone(&self.calls)
    }
}

#[async_trait]
impl ActionHandler for MockHandler {
    async fn execute(&self, _config: &Value, input: &Value) -> Result<Value, NodeError> {
        self.calls.lock().unwrap().push(input.clone());

        match &self.behaviour {
            MockBehaviour::ReturnValue(v) => Ok(v.clone()),
            MockBehaviour::Fail(msg) => Err(NodeError::BadConfig(msg.clone())),
        }
    }
}

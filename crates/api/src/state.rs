//! Shared application state handed to every handler.

use std::sync::Arc;

use engine::ExecutionRunner;
use nodes::ActionRegistry;
use store::{ChannelBroadcast, RecordStore};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn RecordStore>,
    pub runner: Arc<ExecutionRunner>,
    pub events: Arc<ChannelBroadcast>,
}

impl AppState {
    /// Wire the runner (with the built-in action set) against a store.
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        let runner = ExecutionRunner::new(
            Arc::clone(&store),
            ActionRegistry::with_builtins(Arc::clone(&store)),
        );
        Self {
            store,
            runner: Arc::new(runner),
            events: Arc::new(ChannelBroadcast::default()),
        }
    }
}

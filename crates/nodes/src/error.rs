//! Node-level error type.

use thiserror::Error;

/// Errors returned while executing a single node's operation.
///
/// These abort the whole run: the engine performs no retries, so every
/// variant is terminal for the execution that hit it.  Degenerate but
/// *expected* inputs — an unknown condition operator, an unknown action
/// type — are not errors and never surface here.
#[derive(Debug, Error)]
pub enum NodeError {
    /// The external record store failed (or a required row was missing).
    #[error("store error: {0}")]
    Store(#[from] store::StoreError),

    /// The node's configuration is missing a field the operation needs.
    #[error("malformed action config: {0}")]
    BadConfig(String),
}

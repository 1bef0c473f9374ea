//! Typed error type for the store crate.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    /// No row in the table matched the given filter.
    #[error("no row in '{table}' matches the given filter")]
    NotFound { table: String },

    /// Rows are JSON objects; anything else is rejected at the boundary.
    #[error("record for table '{table}' must be a JSON object")]
    NotAnObject { table: String },

    /// Error surfaced by a remote backend implementation.
    #[error("store backend error: {0}")]
    Backend(String),
}

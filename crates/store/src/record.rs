//! The `RecordStore` trait — the contract every storage backend must fulfil.
//!
//! Rows are `serde_json::Value` objects.  Filters are equality-only: a row
//! matches when every `(key, value)` pair in the filter equals the row's
//! field of the same name.  That is all the engine needs — definition
//! lookup, execution records, and record-producing actions all address
//! rows this way.

use async_trait::async_trait;
use serde_json::Value;

use crate::StoreError;

/// Equality filter: field name → required value.
pub type Filter = serde_json::Map<String, Value>;

/// Build a [`Filter`] from `(field, value)` pairs.
pub fn filter<const N: usize>(pairs: [(&str, Value); N]) -> Filter {
    pairs
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
}

/// Table-oriented record store.
///
/// Implementations must be safe to share across concurrent runs; the
/// engine performs no cross-row transactions and expects none.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Insert a new row.  Backends assign an `id` field if the record
    /// doesn't carry one, and return the stored row.
    async fn insert(&self, table: &str, record: Value) -> Result<Value, StoreError>;

    /// Return every row matching the filter (possibly empty).
    async fn select(&self, table: &str, filter: &Filter) -> Result<Vec<Value>, StoreError>;

    /// Merge `updates` into every row matching the filter and return the
    /// updated rows.  An empty result means nothing matched — callers that
    /// rely on conditional transitions (e.g. `running → completed`) use
    /// this to detect a lost race.
    async fn update(
        &self,
        table: &str,
        filter: &Filter,
        updates: Value,
    ) -> Result<Vec<Value>, StoreError>;

    /// Insert the row, replacing an existing row with the same `id`.
    async fn upsert(&self, table: &str, record: Value) -> Result<Value, StoreError>;
}

//! In-memory `RecordStore` backed by a concurrent table map.
//!
//! One `DashMap` entry per table, each holding the table's rows in insert
//! order.  Row-level operations lock only the table they touch, so
//! concurrent runs against different tables never contend.

use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::Value;
use uuid::Uuid;

use crate::record::{Filter, RecordStore};
use crate::StoreError;

/// Process-local record store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: DashMap<String, Vec<Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of rows currently held in `table`.
    pub fn row_count(&self, table: &str) -> usize {
        self.tables.get(table).map_or(0, |rows| rows.len())
    }
}

/// A row matches when every filter field equals the row's field.
fn matches(row: &Value, filter: &Filter) -> bool {
    filter
        .iter()
        .all(|(key, expected)| row.get(key) == Some(expected))
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn insert(&self, table: &str, record: Value) -> Result<Value, StoreError> {
        let mut record = record;
        let fields = record.as_object_mut().ok_or_else(|| StoreError::NotAnObject {
            table: table.to_string(),
        })?;

        if !fields.contains_key("id") {
            fields.insert("id".into(), Value::String(Uuid::new_v4().to_string()));
        }

        self.tables
            .entry(table.to_string())
            .or_default()
            .push(record.clone());

        Ok(record)
    }

    async fn select(&self, table: &str, filter: &Filter) -> Result<Vec<Value>, StoreError> {
        let rows = match self.tables.get(table) {
            Some(rows) => rows,
            None => return Ok(Vec::new()),
        };

        Ok(rows
            .iter()
            .filter(|row| matches(row, filter))
            .cloned()
            .collect())
    }

    async fn update(
        &self,
        table: &str,
        filter: &Filter,
        updates: Value,
    ) -> Result<Vec<Value>, StoreError> {
        let patch = updates.as_object().ok_or_else(|| StoreError::NotAnObject {
            table: table.to_string(),
        })?;

        let mut rows = match self.tables.get_mut(table) {
            Some(rows) => rows,
            None => return Ok(Vec::new()),
        };

        let mut updated = Vec::new();
        for row in rows.iter_mut() {
            if !matches(row, filter) {
                continue;
            }
            if let Some(fields) = row.as_object_mut() {
                for (key, value) in patch {
                    fields.insert(key.clone(), value.clone());
                }
            }
            updated.push(row.clone());
        }

        Ok(updated)
    }

    async fn upsert(&self, table: &str, record: Value) -> Result<Value, StoreError> {
        if record.as_object().is_none() {
            return Err(StoreError::NotAnObject {
                table: table.to_string(),
            });
        }

        if let Some(id) = record.get("id").cloned() {
            let mut rows = self.tables.entry(table.to_string()).or_default();
            if let Some(existing) = rows.iter_mut().find(|row| row.get("id") == Some(&id)) {
                *existing = record.clone();
                return Ok(record);
            }
        }

        self.insert(table, record).await
    }
}

// ============================================================
// Unit tests
// ============================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::filter;
    use serde_json::json;

    #[tokio::test]
    async fn insert_assigns_an_id_when_missing() {
        let store = MemoryStore::new();
        let row = store.insert("tasks", json!({ "title": "hello" })).await.unwrap();
        assert!(row["id"].is_string());
        assert_eq!(store.row_count("tasks"), 1);
    }

    #[tokio::test]
    async fn insert_keeps_an_explicit_id() {
        let store = MemoryStore::new();
        let row = store.insert("tasks", json!({ "id": "t-1" })).await.unwrap();
        assert_eq!(row["id"], "t-1");
    }

    #[tokio::test]
    async fn non_object_rows_are_rejected() {
        let store = MemoryStore::new();
        let err = store.insert("tasks", json!("not a row")).await.unwrap_err();
        assert!(matches!(err, StoreError::NotAnObject { .. }));
    }

    #[tokio::test]
    async fn select_applies_the_equality_filter() {
        let store = MemoryStore::new();
        store.insert("tasks", json!({ "id": "a", "status": "open" })).await.unwrap();
        store.insert("tasks", json!({ "id": "b", "status": "done" })).await.unwrap();

        let open = store
            .select("tasks", &filter([("status", json!("open"))]))
            .await
            .unwrap();
        assert_eq!(open.len(), 1);
        assert_eq!(open[0]["id"], "a");

        let none = store
            .select("tasks", &filter([("status", json!("missing"))]))
            .await
            .unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn update_merges_fields_into_matching_rows() {
        let store = MemoryStore::new();
        store.insert("tasks", json!({ "id": "a", "status": "open" })).await.unwrap();

        let updated = store
            .update(
                "tasks",
                &filter([("id", json!("a"))]),
                json!({ "status": "done", "closed_by": "tests" }),
            )
            .await
            .unwrap();

        assert_eq!(updated.len(), 1);
        assert_eq!(updated[0]["status"], "done");
        assert_eq!(updated[0]["closed_by"], "tests");

        // The stored row was mutated, not a copy.
        let rows = store.select("tasks", &filter([("id", json!("a"))])).await.unwrap();
        assert_eq!(rows[0]["status"], "done");
    }

    #[tokio::test]
    async fn update_with_no_match_returns_empty() {
        let store = MemoryStore::new();
        store.insert("tasks", json!({ "id": "a", "status": "open" })).await.unwrap();

        let updated = store
            .update("tasks", &filter([("id", json!("ghost"))]), json!({ "status": "done" }))
            .await
            .unwrap();
        assert!(updated.is_empty());
    }

    #[tokio::test]
    async fn upsert_replaces_a_row_with_the_same_id() {
        let store = MemoryStore::new();
        store.insert("tasks", json!({ "id": "a", "status": "open" })).await.unwrap();

        store
            .upsert("tasks", json!({ "id": "a", "status": "done" }))
            .await
            .unwrap();

        assert_eq!(store.row_count("tasks"), 1);
        let rows = store.select("tasks", &filter([("id", json!("a"))])).await.unwrap();
        assert_eq!(rows[0]["status"], "done");
    }

    #[tokio::test]
    async fn upsert_inserts_when_the_id_is_new() {
        let store = MemoryStore::new();
        store.upsert("tasks", json!({ "id": "a" })).await.unwrap();
        store.upsert("tasks", json!({ "id": "b" })).await.unwrap();
        assert_eq!(store.row_count("tasks"), 2);
    }
}

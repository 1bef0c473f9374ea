//! Action dispatch — a registry of named, side-effecting operations.
//!
//! `ActionRegistry` maps `actionType` strings to [`ActionHandler`]
//! implementations, so new action types are added by registration rather
//! than by editing a switch.  Dispatch is total over all strings: an
//! unregistered type yields a success acknowledgment instead of an error
//! (in contrast to the condition evaluator, which fails closed on unknown
//! operators — the two policies are intentionally separate).

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use serde_json::{json, Value};
use tracing::info;

use store::{filter, RecordStore, StoreError};

use crate::traits::ActionHandler;
use crate::NodeError;

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// String-keyed map of action handlers.
pub struct ActionRegistry {
    handlers: HashMap<String, Arc<dyn ActionHandler>>,
}

impl ActionRegistry {
    /// An empty registry (mostly for tests; production callers want
    /// [`ActionRegistry::with_builtins`]).
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// The standard handler set, wired against the given record store.
    pub fn with_builtins(store: Arc<dyn RecordStore>) -> Self {
        let mut registry = Self::new();

        registry.register(
            "create_task",
            Arc::new(CreateRecord {
                store: Arc::clone(&store),
                default_table: "tasks",
            }),
        );
        registry.register(
            "create_record",
            Arc::new(CreateRecord {
                store: Arc::clone(&store),
                default_table: "records",
            }),
        );
        registry.register("send_notification", Arc::new(SendNotification));
        registry.register("send_email", Arc::new(SendNotification));
        registry.register("update_record", Arc::new(UpdateRecord { store }));
        registry.register("log_message", Arc::new(LogMessage));

        registry
    }

    /// Register (or replace) the handler for an action type.
    pub fn register(&mut self, action_type: impl Into<String>, handler: Arc<dyn ActionHandler>) {
        self.handlers.insert(action_type.into(), handler);
    }

    /// Dispatch the action named by `config["actionType"]`.
    ///
    /// # Errors
    /// Only errors raised by a registered handler (store failures,
    /// malformed config) propagate; an unknown action type does not.
    pub async fn dispatch(&self, config: &Value, input: &Value) -> Result<Value, NodeError> {
        let action_type = config
            .get("actionType")
            .or_else(|| config.get("action_type"))
            .and_then(Value::as_str)
            .unwrap_or("unknown");

        match self.handlers.get(action_type) {
            Some(handler) => handler.execute(config, input).await,
            None => Ok(json!({
                "success": true,
                "message": format!("Action {action_type} executed"),
                "inputData": input,
            })),
        }
    }
}

impl Default for ActionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Built-in handlers
// ---------------------------------------------------------------------------

/// `create_task` / `create_record` — insert a row into a named table.
struct CreateRecord {
    store: Arc<dyn RecordStore>,
    default_table: &'static str,
}

#[async_trait::async_trait]
impl ActionHandler for CreateRecord {
    async fn execute(&self, config: &Value, _input: &Value) -> Result<Value, NodeError> {
        let table = config
            .get("table")
            .and_then(Value::as_str)
            .unwrap_or(self.default_table);
        let record = config.get("record").cloned().unwrap_or_else(|| json!({}));

        let created = self.store.insert(table, record).await?;

        Ok(json!({
            "success": true,
            "record": created,
            "timestamp": Utc::now().to_rfc3339(),
        }))
    }
}

/// `send_notification` / `send_email` — acknowledge what would be sent.
///
/// Real delivery belongs to an external collaborator; this core only
/// records the intent.
struct SendNotification;

#[async_trait::async_trait]
impl ActionHandler for SendNotification {
    async fn execute(&self, config: &Value, _input: &Value) -> Result<Value, NodeError> {
        let recipient = config
            .get("recipient")
            .or_else(|| config.get("to"))
            .and_then(Value::as_str)
            .unwrap_or("unspecified");
        let subject = config.get("subject").cloned().unwrap_or(Value::Null);
        let body = config
            .get("body")
            .or_else(|| config.get("message"))
            .cloned()
            .unwrap_or(Value::Null);

        Ok(json!({
            "success": true,
            "message": format!("Notification queued for {recipient}"),
            "timestamp": Utc::now().to_rfc3339(),
            "recipient": recipient,
            "subject": subject,
            "body": body,
        }))
    }
}

/// `update_record` — merge updates into one row identified by
/// `{table, recordId, updates}`.
struct UpdateRecord {
    store: Arc<dyn RecordStore>,
}

#[async_trait::async_trait]
impl ActionHandler for UpdateRecord {
    async fn execute(&self, config: &Value, _input: &Value) -> Result<Value, NodeError> {
        let table = config
            .get("table")
            .and_then(Value::as_str)
            .unwrap_or("records");
        let record_id = config
            .get("recordId")
            .or_else(|| config.get("record_id"))
            .cloned()
            .ok_or_else(|| NodeError::BadConfig("update_record requires 'recordId'".into()))?;
        let updates = config
            .get("updates")
            .cloned()
            .ok_or_else(|| NodeError::BadConfig("update_record requires 'updates'".into()))?;

        let mut rows = self
            .store
            .update(table, &filter([("id", record_id)]), updates)
            .await?;

        let updated = rows.pop().ok_or_else(|| {
            NodeError::Store(StoreError::NotFound {
                table: table.to_string(),
            })
        })?;

        Ok(json!({
            "success": true,
            "record": updated,
            "timestamp": Utc::now().to_rfc3339(),
        }))
    }
}

/// `log_message` — pure bookkeeping, no external effect.
struct LogMessage;

#[async_trait::async_trait]
impl ActionHandler for LogMessage {
    async fn execute(&self, config: &Value, input: &Value) -> Result<Value, NodeError> {
        let message = config
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("Workflow log")
            .to_string();

        info!("workflow log: {message}");

        Ok(json!({
            "success": true,
            "message": message,
            "timestamp": Utc::now().to_rfc3339(),
            "inputData": input,
        }))
    }
}

// ============================================================
// Unit tests
// ============================================================
#[cfg(test)]
mod tests {
    use super::*;
    use store::MemoryStore;

    fn registry_with_store() -> (ActionRegistry, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let registry = ActionRegistry::with_builtins(store.clone() as Arc<dyn RecordStore>);
        (registry, store)
    }

    #[tokio::test]
    async fn create_task_inserts_into_the_default_table() {
        let (registry, store) = registry_with_store();

        let output = registry
            .dispatch(
                &json!({ "actionType": "create_task", "record": { "title": "review invoice" } }),
                &json!({}),
            )
            .await
            .unwrap();

        assert_eq!(output["success"], json!(true));
        assert_eq!(output["record"]["title"], "review invoice");
        assert!(output["record"]["id"].is_string());
        assert_eq!(store.row_count("tasks"), 1);
    }

    #[tokio::test]
    async fn create_record_honours_an_explicit_table() {
        let (registry, store) = registry_with_store();

        registry
            .dispatch(
                &json!({ "actionType": "create_record", "table": "invoices", "record": {} }),
                &json!({}),
            )
            .await
            .unwrap();

        assert_eq!(store.row_count("invoices"), 1);
        assert_eq!(store.row_count("records"), 0);
    }

    #[tokio::test]
    async fn send_email_acknowledges_without_delivering() {
        let (registry, _) = registry_with_store();

        let output = registry
            .dispatch(
                &json!({
                    "actionType": "send_email",
                    "recipient": "hr@example.com",
                    "subject": "Leave approved",
                }),
                &json!({}),
            )
            .await
            .unwrap();

        assert_eq!(output["success"], json!(true));
        assert_eq!(output["recipient"], "hr@example.com");
        assert_eq!(output["subject"], "Leave approved");
        assert!(output["timestamp"].is_string());
    }

    #[tokio::test]
    async fn update_record_merges_and_returns_the_row() {
        let (registry, store) = registry_with_store();
        store
            .insert("records", json!({ "id": "r-1", "status": "open" }))
            .await
            .unwrap();

        let output = registry
            .dispatch(
                &json!({
                    "actionType": "update_record",
                    "table": "records",
                    "recordId": "r-1",
                    "updates": { "status": "closed" },
                }),
                &json!({}),
            )
            .await
            .unwrap();

        assert_eq!(output["record"]["status"], "closed");
    }

    #[tokio::test]
    async fn update_record_on_a_missing_row_is_a_store_error() {
        let (registry, _) = registry_with_store();

        let err = registry
            .dispatch(
                &json!({
                    "actionType": "update_record",
                    "recordId": "ghost",
                    "updates": { "status": "closed" },
                }),
                &json!({}),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, NodeError::Store(StoreError::NotFound { .. })));
    }

    #[tokio::test]
    async fn update_record_without_record_id_is_bad_config() {
        let (registry, _) = registry_with_store();

        let err = registry
            .dispatch(
                &json!({ "actionType": "update_record", "updates": {} }),
                &json!({}),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, NodeError::BadConfig(_)));
    }

    #[tokio::test]
    async fn log_message_carries_the_input_through() {
        let (registry, _) = registry_with_store();

        let output = registry
            .dispatch(
                &json!({ "actionType": "log_message", "message": "audit checkpoint" }),
                &json!({ "employee": "e-7" }),
            )
            .await
            .unwrap();

        assert_eq!(output["message"], "audit checkpoint");
        assert_eq!(output["inputData"], json!({ "employee": "e-7" }));
    }

    #[tokio::test]
    async fn unknown_action_type_acknowledges_with_success() {
        let (registry, _) = registry_with_store();

        let output = registry
            .dispatch(
                &json!({ "actionType": "summon_intern" }),
                &json!({ "x": 1 }),
            )
            .await
            .unwrap();

        assert_eq!(output["success"], json!(true));
        assert_eq!(output["message"], "Action summon_intern executed");
        assert_eq!(output["inputData"], json!({ "x": 1 }));
    }
}

//! Execution-record lifecycle.
//!
//! `ExecutionRunner` owns every write to an execution record between
//! `begin` and `finish`.  `finish` is a conditional transition: it only
//! moves a record *out of* `running`, so an external cancel that landed
//! first is never overwritten by a late `completed`/`failed`.

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use nodes::ActionRegistry;
use store::{filter, RecordStore};

use crate::executor::{NodeRun, WorkflowExecutor};
use crate::models::{ExecutionRecord, ExecutionStatus, WorkflowDefinition};
use crate::EngineError;

/// Table holding [`ExecutionRecord`] rows.
pub const EXECUTIONS_TABLE: &str = "workflow_executions";

/// Table holding workflow rows (`{id, name, definition}`).
pub const WORKFLOWS_TABLE: &str = "workflows";

// ---------------------------------------------------------------------------
// Handles and outcomes
// ---------------------------------------------------------------------------

/// Proof that a `running` record exists; consumed by [`ExecutionRunner::finish`].
#[derive(Debug)]
pub struct RecordHandle {
    pub execution_id: Uuid,
    pub started_at: DateTime<Utc>,
    started: Instant,
}

impl RecordHandle {
    /// Wall-clock milliseconds since `begin`, measured monotonically.
    pub fn elapsed_ms(&self) -> i64 {
        i64::try_from(self.started.elapsed().as_millis()).unwrap_or(i64::MAX)
    }
}

/// How a run ended.
#[derive(Debug)]
pub enum RunOutcome {
    Completed(Value),
    Failed(String),
}

/// What the caller of [`ExecutionRunner::execute`] gets back.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReport {
    pub execution_id: Uuid,
    pub status: ExecutionStatus,
    #[serde(rename = "nodeExecutions")]
    pub results: Vec<NodeRun>,
    pub error: Option<String>,
    pub execution_time_ms: i64,
}

// ---------------------------------------------------------------------------
// ExecutionRunner
// ---------------------------------------------------------------------------

/// Wraps the traversal engine with record bookkeeping.
pub struct ExecutionRunner {
    store: Arc<dyn RecordStore>,
    executor: WorkflowExecutor,
}

impl ExecutionRunner {
    pub fn new(store: Arc<dyn RecordStore>, actions: ActionRegistry) -> Self {
        Self {
            store,
            executor: WorkflowExecutor::new(actions),
        }
    }

    /// Create the record in `running` state and start the clock.
    pub async fn begin(&self, workflow_id: &str, input: &Value) -> Result<RecordHandle, EngineError> {
        let record = ExecutionRecord {
            id: Uuid::new_v4(),
            workflow_id: workflow_id.to_string(),
            status: ExecutionStatus::Running,
            input_data: input.clone(),
            output_data: None,
            error_message: None,
            execution_time_ms: None,
            started_at: Utc::now(),
            completed_at: None,
        };

        self.store
            .insert(EXECUTIONS_TABLE, serde_json::to_value(&record)?)
            .await?;

        info!("execution {} started for workflow '{}'", record.id, workflow_id);

        Ok(RecordHandle {
            execution_id: record.id,
            started_at: record.started_at,
            started: Instant::now(),
        })
    }

    /// Transition the record out of `running` exactly once.
    ///
    /// Returns the finalized record, or `None` when the record had already
    /// left `running` (an external cancel won the race); in that case the
    /// stored terminal state is preserved.
    pub async fn finish(
        &self,
        handle: &RecordHandle,
        outcome: RunOutcome,
    ) -> Result<Option<ExecutionRecord>, EngineError> {
        let mut updates = json!({
            "status": match &outcome {
                RunOutcome::Completed(_) => ExecutionStatus::Completed,
                RunOutcome::Failed(_) => ExecutionStatus::Failed,
            },
            "execution_time_ms": handle.elapsed_ms(),
            "completed_at": Utc::now(),
        });
        match outcome {
            RunOutcome::Completed(output) => {
                updates["output_data"] = output;
            }
            RunOutcome::Failed(message) => {
                updates["error_message"] = Value::String(message);
            }
        }

        let mut rows = self
            .store
            .update(
                EXECUTIONS_TABLE,
                &filter([
                    ("id", json!(handle.execution_id)),
                    ("status", json!(ExecutionStatus::Running)),
                ]),
                updates,
            )
            .await?;

        match rows.pop() {
            Some(row) => Ok(Some(serde_json::from_value(row)?)),
            None => {
                warn!(
                    "execution {} was no longer running at finish; leaving its terminal state",
                    handle.execution_id
                );
                Ok(None)
            }
        }
    }

    /// Run one workflow start-to-finish: open the record, traverse the
    /// graph, close the record.
    ///
    /// Node and definition failures come back as a `Failed` report (the
    /// record already carries the message); only store/serialisation
    /// problems surface as `Err`.
    #[instrument(skip(self, definition, input))]
    pub async fn execute(
        &self,
        workflow_id: &str,
        definition: &WorkflowDefinition,
        input: Value,
    ) -> Result<RunReport, EngineError> {
        let handle = self.begin(workflow_id, &input).await?;

        let outcome = self.executor.run(definition, input).await;
        match outcome.error {
            None => {
                let output = serde_json::to_value(&outcome.results)?;
                self.finish(&handle, RunOutcome::Completed(output)).await?;

                info!("execution {} completed", handle.execution_id);
                Ok(RunReport {
                    execution_id: handle.execution_id,
                    status: ExecutionStatus::Completed,
                    results: outcome.results,
                    error: None,
                    execution_time_ms: handle.elapsed_ms(),
                })
            }
            Some(err) => {
                let message = err.to_string();
                error!("execution {} failed: {message}", handle.execution_id);
                self.finish(&handle, RunOutcome::Failed(message.clone()))
                    .await?;

                // The partial trace still tells the caller how far the run
                // got before the error.
                Ok(RunReport {
                    execution_id: handle.execution_id,
                    status: ExecutionStatus::Failed,
                    results: outcome.results,
                    error: Some(message),
                    execution_time_ms: handle.elapsed_ms(),
                })
            }
        }
    }

    /// Fetch the workflow row by id, parse its `definition`, and execute.
    pub async fn run_by_id(&self, workflow_id: &str, input: Value) -> Result<RunReport, EngineError> {
        let rows = self
            .store
            .select(WORKFLOWS_TABLE, &filter([("id", json!(workflow_id))]))
            .await?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| EngineError::WorkflowNotFound(workflow_id.to_string()))?;

        let definition: WorkflowDefinition =
            serde_json::from_value(row.get("definition").cloned().unwrap_or(Value::Null))
                .map_err(|e| EngineError::MalformedDefinition(e.to_string()))?;

        self.execute(workflow_id, &definition, input).await
    }

    /// Fetch a persisted execution record.
    pub async fn fetch_execution(&self, execution_id: Uuid) -> Result<ExecutionRecord, EngineError> {
        let rows = self
            .store
            .select(EXECUTIONS_TABLE, &filter([("id", json!(execution_id))]))
            .await?;
        let row = rows
            .into_iter()
            .next()
            .ok_or(EngineError::ExecutionNotFound(execution_id))?;

        Ok(serde_json::from_value(row)?)
    }

    /// The external cancel operation: `running → cancelled`, conditionally.
    ///
    /// Returns whether the transition happened.  A record already in a
    /// terminal state is left untouched, and an in-flight traversal is not
    /// interrupted — its own `finish` will then find the record cancelled
    /// and back off.
    pub async fn cancel(&self, execution_id: Uuid) -> Result<bool, EngineError> {
        let rows = self
            .store
            .update(
                EXECUTIONS_TABLE,
                &filter([
                    ("id", json!(execution_id)),
                    ("status", json!(ExecutionStatus::Running)),
                ]),
                json!({
                    "status": ExecutionStatus::Cancelled,
                    "completed_at": Utc::now(),
                }),
            )
            .await?;

        Ok(!rows.is_empty())
    }
}

//! Run, inspect, and cancel executions.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};
use uuid::Uuid;

use engine::{EngineError, ExecutionStatus};
use store::Broadcast;

use super::workflows::{bad_request, internal, not_found};
use crate::AppState;

/// Both the camelCase and snake_case spellings in the wild are accepted.
#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunRequestDto {
    #[serde(alias = "flow_id")]
    pub workflow_id: String,
    #[serde(default, alias = "trigger_payload")]
    pub input_data: Value,
}

pub async fn run(
    State(state): State<AppState>,
    Json(payload): Json<RunRequestDto>,
) -> Result<(StatusCode, Json<Value>), (StatusCode, Json<Value>)> {
    let input = if payload.input_data.is_null() {
        json!({})
    } else {
        payload.input_data
    };

    let report = state
        .runner
        .run_by_id(&payload.workflow_id, input)
        .await
        .map_err(|err| match err {
            EngineError::WorkflowNotFound(_) => not_found(err.to_string()),
            EngineError::MalformedDefinition(_) => bad_request(err.to_string()),
            other => internal(other.to_string()),
        })?;

    state.events.publish(
        "execution_completed",
        json!({
            "executionId": report.execution_id,
            "workflowId": payload.workflow_id,
            "status": report.status,
        }),
    );

    match report.status {
        ExecutionStatus::Completed => Ok((
            StatusCode::OK,
            Json(json!({
                "success": true,
                "executionId": report.execution_id,
                "executionTimeMs": report.execution_time_ms,
                "nodeExecutions": report.results,
                "error": null,
            })),
        )),
        _ => Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "success": false,
                "executionId": report.execution_id,
                "nodeExecutions": report.results,
                "error": report.error,
            })),
        )),
    }
}

pub async fn get_one(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    match state.runner.fetch_execution(id).await {
        Ok(record) => Ok(Json(
            serde_json::to_value(record).map_err(|e| internal(e.to_string()))?,
        )),
        Err(EngineError::ExecutionNotFound(_)) => Err(not_found("execution not found")),
        Err(other) => Err(internal(other.to_string())),
    }
}

pub async fn cancel(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let cancelled = state
        .runner
        .cancel(id)
        .await
        .map_err(|e| internal(e.to_string()))?;

    if cancelled {
        Ok(Json(json!({ "success": true, "executionId": id })))
    } else {
        Err((
            StatusCode::CONFLICT,
            Json(json!({ "success": false, "error": "execution is not running" })),
        ))
    }
}

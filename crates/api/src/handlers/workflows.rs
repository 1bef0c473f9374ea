//! Workflow CRUD over the record store.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};

use engine::runner::WORKFLOWS_TABLE;
use engine::{validate_definition, WorkflowDefinition};
use store::filter;

use crate::AppState;

#[derive(serde::Deserialize)]
pub struct CreateWorkflowDto {
    pub name: String,
    pub definition: Value,
}

pub async fn create(
    State(state): State<AppState>,
    Json(payload): Json<CreateWorkflowDto>,
) -> Result<(StatusCode, Json<Value>), (StatusCode, Json<Value>)> {
    // Reject definitions the engine could never run.
    let definition: WorkflowDefinition = serde_json::from_value(payload.definition.clone())
        .map_err(|e| bad_request(format!("invalid definition: {e}")))?;
    validate_definition(&definition).map_err(|e| bad_request(e.to_string()))?;

    let row = state
        .store
        .insert(
            WORKFLOWS_TABLE,
            json!({ "name": payload.name, "definition": payload.definition }),
        )
        .await
        .map_err(|e| internal(e.to_string()))?;

    Ok((StatusCode::CREATED, Json(row)))
}

pub async fn list(
    State(state): State<AppState>,
) -> Result<Json<Vec<Value>>, (StatusCode, Json<Value>)> {
    let mut rows = state
        .store
        .select(WORKFLOWS_TABLE, &filter([]))
        .await
        .map_err(|e| internal(e.to_string()))?;
    rows.retain(|row| row.get("deleted") != Some(&json!(true)));
    Ok(Json(rows))
}

pub async fn get_one(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let rows = state
        .store
        .select(WORKFLOWS_TABLE, &filter([("id", json!(id))]))
        .await
        .map_err(|e| internal(e.to_string()))?;

    match rows
        .into_iter()
        .find(|row| row.get("deleted") != Some(&json!(true)))
    {
        Some(row) => Ok(Json(row)),
        None => Err(not_found("workflow not found")),
    }
}

pub async fn delete(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<StatusCode, (StatusCode, Json<Value>)> {
    // The store trait has no delete; tombstone the row instead.
    let rows = state
        .store
        .update(
            WORKFLOWS_TABLE,
            &filter([("id", json!(id))]),
            json!({ "deleted": true }),
        )
        .await
        .map_err(|e| internal(e.to_string()))?;

    if rows.is_empty() {
        return Err(not_found("workflow not found"));
    }
    Ok(StatusCode::NO_CONTENT)
}

pub(super) fn bad_request(message: impl Into<String>) -> (StatusCode, Json<Value>) {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "success": false, "error": message.into() })),
    )
}

pub(super) fn not_found(message: impl Into<String>) -> (StatusCode, Json<Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "success": false, "error": message.into() })),
    )
}

pub(super) fn internal(message: impl Into<String>) -> (StatusCode, Json<Value>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "success": false, "error": message.into() })),
    )
}

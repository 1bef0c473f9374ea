//! HTTP-level tests against the full router, no network involved.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use api::{build_router, AppState};
use store::{MemoryStore, RecordStore};

fn state_with_store() -> (AppState, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    (AppState::new(store.clone() as Arc<dyn RecordStore>), store)
}

async fn seed_workflow(store: &MemoryStore, id: &str) {
    store
        .insert(
            "workflows",
            json!({
                "id": id,
                "name": "gated log",
                "definition": {
                    "nodes": [
                        { "id": "t", "type": "trigger", "data": null },
                        {
                            "id": "c",
                            "type": "condition",
                            "data": { "field": "x", "operator": "equals", "value": 1 },
                        },
                        {
                            "id": "a",
                            "type": "action",
                            "data": { "actionType": "log_message", "message": "hello" },
                        },
                    ],
                    "edges": [
                        { "id": "e1", "source": "t", "target": "c" },
                        { "id": "e2", "source": "c", "target": "a" },
                    ],
                },
            }),
        )
        .await
        .unwrap();
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn run_endpoint_executes_a_stored_workflow() {
    let (state, store) = state_with_store();
    seed_workflow(&store, "wf-1").await;

    let response = build_router(state)
        .oneshot(post_json(
            "/api/v1/executions",
            json!({ "workflowId": "wf-1", "inputData": { "x": 1 } }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["error"], Value::Null);
    assert!(body["executionTimeMs"].as_i64().unwrap() >= 0);
    assert_eq!(body["nodeExecutions"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn run_endpoint_accepts_snake_case_aliases() {
    let (state, store) = state_with_store();
    seed_workflow(&store, "wf-2").await;

    let response = build_router(state)
        .oneshot(post_json(
            "/api/v1/executions",
            json!({ "flow_id": "wf-2", "trigger_payload": { "x": 2 } }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    // x != 1, so the action never ran: trigger + condition only.
    assert_eq!(body["nodeExecutions"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn unknown_workflow_is_a_404() {
    let (state, _) = state_with_store();

    let response = build_router(state)
        .oneshot(post_json(
            "/api/v1/executions",
            json!({ "workflowId": "ghost" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["success"], json!(false));
    assert!(body["error"].as_str().unwrap().contains("ghost"));
}

#[tokio::test]
async fn create_workflow_rejects_an_unrunnable_definition() {
    let (state, _) = state_with_store();

    // No trigger node — the engine could never start this graph.
    let response = build_router(state)
        .oneshot(post_json(
            "/api/v1/workflows",
            json!({
                "name": "broken",
                "definition": {
                    "nodes": [{ "id": "a", "type": "action", "data": {} }],
                    "edges": [],
                },
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn create_then_list_round_trips() {
    let (state, _) = state_with_store();
    let router = build_router(state);

    let created = router
        .clone()
        .oneshot(post_json(
            "/api/v1/workflows",
            json!({
                "name": "solo trigger",
                "definition": {
                    "nodes": [{ "id": "t", "type": "trigger", "data": null }],
                    "edges": [],
                },
            }),
        ))
        .await
        .unwrap();
    assert_eq!(created.status(), StatusCode::CREATED);

    let listed = router
        .oneshot(
            Request::builder()
                .uri("/api/v1/workflows")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(listed.status(), StatusCode::OK);
    let body = body_json(listed).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn cancel_after_completion_conflicts() {
    let (state, store) = state_with_store();
    seed_workflow(&store, "wf-3").await;
    let router = build_router(state);

    let run = router
        .clone()
        .oneshot(post_json(
            "/api/v1/executions",
            json!({ "workflowId": "wf-3", "inputData": { "x": 1 } }),
        ))
        .await
        .unwrap();
    let body = body_json(run).await;
    let execution_id = body["executionId"].as_str().unwrap().to_string();

    let cancel = router
        .oneshot(post_json(
            &format!("/api/v1/executions/{execution_id}/cancel"),
            json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(cancel.status(), StatusCode::CONFLICT);
}

//! `api` crate — HTTP layer over the workflow engine.
//!
//! Routes (all under `/api/v1`):
//!   POST   /workflows
//!   GET    /workflows
//!   GET    /workflows/{id}
//!   DELETE /workflows/{id}
//!   POST   /executions
//!   GET    /executions/{id}
//!   POST   /executions/{id}/cancel
//!
//! CORS is wide open (the callers are browser front ends on arbitrary
//! origins); the CORS layer also answers `OPTIONS` preflights.

pub mod handlers;
pub mod state;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

pub use state::AppState;

/// Build the complete API router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        .route(
            "/workflows",
            post(handlers::workflows::create).get(handlers::workflows::list),
        )
        .route(
            "/workflows/{id}",
            get(handlers::workflows::get_one).delete(handlers::workflows::delete),
        )
        .route("/executions", post(handlers::executions::run))
        .route("/executions/{id}", get(handlers::executions::get_one))
        .route("/executions/{id}/cancel", post(handlers::executions::cancel))
        .with_state(state);

    Router::new()
        .nest("/api/v1", api_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Bind and serve until the process is stopped.
pub async fn serve(bind: &str, state: AppState) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(bind).await?;
    info!("API listening on {}", listener.local_addr()?);
    axum::serve(listener, build_router(state)).await
}

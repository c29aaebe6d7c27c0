//! HTTP server for the state store.
//!
//! Provides, under the configured API prefix:
//! - Task records (`/tasks`, `/tasks/{taskId}`, `/tasks/{groupId}/{taskId}`)
//! - Group records (`/groups/{groupId}`)
//! - The chord latch (`/groups/{groupId}/chord-triggered`)
//!
//! and a health check at `/health`.

use std::sync::Arc;

use axum::{
    routing::{get, patch, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub mod error;
mod handlers;

/// Create the HTTP router.
pub fn create_router(state: Arc<AppState>, api_prefix: &str) -> Router {
    // Path parameters share a name per position; handlers extract them by
    // position.
    let api = Router::new()
        .route("/tasks", get(handlers::fetch_tasks))
        .route(
            "/tasks/:id",
            get(handlers::fetch_task)
                .post(handlers::create_task)
                .patch(handlers::update_task)
                .delete(handlers::delete_task),
        )
        .route("/tasks/:id/:task_id", post(handlers::create_grouped_task))
        .route(
            "/groups/:id",
            get(handlers::fetch_group)
                .post(handlers::create_group)
                .delete(handlers::delete_group),
        )
        .route("/groups/:id/chord-triggered", patch(handlers::trigger_chord));

    let prefix = api_prefix.trim_matches('/');
    let router = if prefix.is_empty() {
        Router::new().merge(api)
    } else {
        Router::new().nest(&format!("/{prefix}"), api)
    };

    router
        .route("/health", get(handlers::health_check))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

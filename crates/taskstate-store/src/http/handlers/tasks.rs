//! Task record handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use taskstate_client::wire::CreateTaskRequest;
use taskstate_core::{StateError, StatusUpdate, TaskSignature, TaskState, TaskUuid};

use crate::http::error::ApiError;
use crate::state::AppState;

/// Create a PENDING task outside any group.
pub async fn create_task(
    State(state): State<Arc<AppState>>,
    Path(task_id): Path<String>,
    Json(req): Json<CreateTaskRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let signature = TaskSignature::new(task_id, req.task_name);
    let created = state.records.create_task(&signature).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Create a PENDING task belonging to a group.
pub async fn create_grouped_task(
    State(state): State<Arc<AppState>>,
    Path((group_id, task_id)): Path<(String, String)>,
    Json(req): Json<CreateTaskRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let signature = TaskSignature::new(task_id, req.task_name).in_group(group_id);
    let created = state.records.create_task(&signature).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn fetch_task(
    State(state): State<Arc<AppState>>,
    Path(task_id): Path<String>,
) -> Result<Json<TaskState>, ApiError> {
    let task = state.records.fetch_task(&TaskUuid::new(task_id)).await?;
    Ok(Json(task))
}

/// Bulk fetch via repeated `task_uuid` query parameters.
pub async fn fetch_tasks(
    State(state): State<Arc<AppState>>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Json<Vec<TaskState>>, ApiError> {
    let uuids: Vec<TaskUuid> = params
        .into_iter()
        .filter(|(key, _)| key == "task_uuid")
        .map(|(_, value)| TaskUuid::new(value))
        .collect();
    if uuids.is_empty() {
        let err = StateError::InvalidArgument("missing task_uuid query parameter".to_string());
        return Err(err.into());
    }

    let tasks = state.records.fetch_tasks(&uuids).await?;
    Ok(Json(tasks))
}

pub async fn update_task(
    State(state): State<Arc<AppState>>,
    Path(task_id): Path<String>,
    Json(update): Json<StatusUpdate>,
) -> Result<Json<TaskState>, ApiError> {
    let task = state
        .records
        .update_task(&TaskUuid::new(task_id), update)
        .await?;
    Ok(Json(task))
}

pub async fn delete_task(
    State(state): State<Arc<AppState>>,
    Path(task_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.records.delete_task(&TaskUuid::new(task_id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

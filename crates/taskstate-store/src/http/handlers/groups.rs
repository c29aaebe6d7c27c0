//! Group record and chord latch handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use tracing::info;

use taskstate_client::wire::{ChordTriggerRequest, ChordTriggerResponse, CreateGroupRequest};
use taskstate_core::{GroupMeta, GroupUuid, StateError};

use crate::http::error::ApiError;
use crate::state::AppState;

pub async fn create_group(
    State(state): State<Arc<AppState>>,
    Path(group_id): Path<String>,
    Json(req): Json<CreateGroupRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let group = state
        .records
        .create_group(&GroupUuid::new(group_id), &req.task_uuids)
        .await?;
    info!(group_uuid = %group.group_uuid, members = group.task_count(), "Group registered");
    Ok((StatusCode::CREATED, Json(group)))
}

pub async fn fetch_group(
    State(state): State<Arc<AppState>>,
    Path(group_id): Path<String>,
) -> Result<Json<GroupMeta>, ApiError> {
    let group = state.records.fetch_group(&GroupUuid::new(group_id)).await?;
    Ok(Json(group))
}

pub async fn delete_group(
    State(state): State<Arc<AppState>>,
    Path(group_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.records.delete_group(&GroupUuid::new(group_id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Flip the chord latch atomically and report whether this request did it.
pub async fn trigger_chord(
    State(state): State<Arc<AppState>>,
    Path(group_id): Path<String>,
    Json(req): Json<ChordTriggerRequest>,
) -> Result<Json<ChordTriggerResponse>, ApiError> {
    if !req.chord_triggered {
        let err = StateError::InvalidArgument("the chord latch cannot be reset".to_string());
        return Err(err.into());
    }

    let group_uuid = GroupUuid::new(group_id);
    let updated = state.records.latch_chord(&group_uuid).await?;
    if updated {
        info!(group_uuid = %group_uuid, "Chord latch set");
    }
    Ok(Json(ChordTriggerResponse { updated }))
}

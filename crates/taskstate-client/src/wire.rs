//! Request and response bodies exchanged with the store.
//!
//! Task and group records travel as the core types themselves; only the
//! envelope bodies live here.

use serde::{Deserialize, Serialize};

use taskstate_core::TaskUuid;

/// Body of `POST /tasks/{groupId}/{taskId}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTaskRequest {
    pub task_name: String,
}

/// Body of `POST /groups/{groupId}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateGroupRequest {
    pub task_uuids: Vec<TaskUuid>,
}

/// Body of `PATCH /groups/{groupId}/chord-triggered`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChordTriggerRequest {
    pub chord_triggered: bool,
}

/// Answer to a chord trigger: whether this request flipped the latch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChordTriggerResponse {
    pub updated: bool,
}

/// Error body returned by the reference store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

//! The backend contract consumed by the execution engine.

use async_trait::async_trait;
use tracing::{debug, info};

use taskstate_core::{
    GroupUuid, StateError, StatusUpdate, TaskResult, TaskSignature, TaskState, TaskUuid,
};

/// Records task lifecycle events and answers group/chord questions.
///
/// Implementations never retry and never cache records between calls. A
/// method returns `Ok` only once the store acknowledged the operation.
///
/// Lifecycle events may be delivered more than once (at-least-once). Stores
/// must apply a repeated transition idempotently; implementations of this
/// trait do not deduplicate.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Register a group and its members. Normally done by whoever forms the
    /// group, before any of the group operations below run.
    async fn init_group(
        &self,
        group_uuid: &GroupUuid,
        task_uuids: &[TaskUuid],
    ) -> Result<(), StateError>;

    /// Create the PENDING record for a dispatched signature.
    async fn mark_pending(&self, signature: &TaskSignature) -> Result<(), StateError>;

    /// Submit a partial update of a task's mutable fields.
    async fn update_status(
        &self,
        task_uuid: &TaskUuid,
        update: StatusUpdate,
    ) -> Result<(), StateError>;

    async fn mark_received(&self, signature: &TaskSignature) -> Result<(), StateError> {
        self.update_status(&signature.uuid, StatusUpdate::received()).await
    }

    async fn mark_started(&self, signature: &TaskSignature) -> Result<(), StateError> {
        self.update_status(&signature.uuid, StatusUpdate::started()).await
    }

    async fn mark_retry(&self, signature: &TaskSignature) -> Result<(), StateError> {
        self.update_status(&signature.uuid, StatusUpdate::retry()).await
    }

    async fn mark_success(
        &self,
        signature: &TaskSignature,
        results: Vec<TaskResult>,
    ) -> Result<(), StateError> {
        self.update_status(&signature.uuid, StatusUpdate::success(results)).await
    }

    async fn mark_failure(&self, signature: &TaskSignature, error: &str) -> Result<(), StateError> {
        self.update_status(&signature.uuid, StatusUpdate::failure(error)).await
    }

    /// Latest state of one task.
    async fn get_state(&self, task_uuid: &TaskUuid) -> Result<TaskState, StateError>;

    /// States of every member of a group, in membership order.
    ///
    /// `expected_count` is the engine's view of the group size; it is only
    /// used for diagnostics.
    async fn group_task_states(
        &self,
        group_uuid: &GroupUuid,
        expected_count: usize,
    ) -> Result<Vec<TaskState>, StateError>;

    /// True iff exactly `expected_count` members are in a terminal state.
    ///
    /// Success and failure count alike: a group whose members all failed is
    /// complete.
    async fn group_completed(
        &self,
        group_uuid: &GroupUuid,
        expected_count: usize,
    ) -> Result<bool, StateError> {
        let states = self.group_task_states(group_uuid, expected_count).await?;
        let completed = count_completed(&states);
        if completed == expected_count {
            info!(group_uuid = %group_uuid, completed, "Group completed");
            return Ok(true);
        }
        debug!(
            group_uuid = %group_uuid,
            completed,
            expected_count,
            "Group not yet completed"
        );
        Ok(false)
    }

    /// Claim the group's chord callback.
    ///
    /// Across all concurrent callers exactly one receives `true`. `false`
    /// means the store reported the latch as already set; any other outcome
    /// is an error.
    async fn trigger_chord(&self, group_uuid: &GroupUuid) -> Result<bool, StateError>;

    /// Delete a task record. Unknown records are reported as `NotFound`.
    async fn purge_state(&self, task_uuid: &TaskUuid) -> Result<(), StateError>;

    /// Delete a group record. Unknown records are reported as `NotFound`.
    async fn purge_group(&self, group_uuid: &GroupUuid) -> Result<(), StateError>;
}

/// Number of states that are SUCCESS or FAILURE.
pub fn count_completed(states: &[TaskState]) -> usize {
    states.iter().filter(|state| state.is_completed()).count()
}

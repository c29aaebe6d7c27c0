//! In-process state store.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use taskstate_core::{
    GroupMeta, GroupUuid, StateError, StatusUpdate, TaskSignature, TaskState, TaskStatus, TaskUuid,
};

use crate::backend::Backend;

#[derive(Default)]
struct Records {
    tasks: HashMap<TaskUuid, TaskState>,
    groups: HashMap<GroupUuid, GroupMeta>,
}

/// Store that keeps every record in memory.
///
/// Enforces what a remote store must enforce: one record per id, monotonic
/// status transitions, idempotent replays and an atomic chord latch. All
/// records sit behind one lock, so every operation is atomic with respect to
/// the others. Clones share the same records.
#[derive(Clone, Default)]
pub struct MemoryBackend {
    records: Arc<RwLock<Records>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a PENDING record.
    ///
    /// A record that is already PENDING (replayed dispatch) or RETRY
    /// (re-dispatch) is reset to PENDING; any other existing record is a
    /// conflict.
    pub async fn create_task(&self, signature: &TaskSignature) -> Result<TaskState, StateError> {
        if signature.uuid.is_empty() {
            return Err(StateError::InvalidArgument("task uuid is empty".to_string()));
        }

        let now = Utc::now();
        let mut records = self.records.write().await;

        if let Some(existing) = records.tasks.get_mut(&signature.uuid) {
            return match existing.status() {
                TaskStatus::Pending | TaskStatus::Retry => {
                    existing.apply(StatusUpdate::pending());
                    existing.touch(now);
                    debug!(task_uuid = %signature.uuid, "Task re-dispatched");
                    Ok(existing.clone())
                }
                other => {
                    warn!(task_uuid = %signature.uuid, status = %other, "Create rejected");
                    Err(StateError::Conflict(format!(
                        "task {} already exists in state {other}",
                        signature.uuid
                    )))
                }
            };
        }

        let mut state = TaskState::pending(signature);
        state.touch(now);
        records.tasks.insert(signature.uuid.clone(), state.clone());
        debug!(task_uuid = %signature.uuid, task_name = %signature.name, "Task created");
        Ok(state)
    }

    /// Apply a status update if the transition table allows it.
    pub async fn update_task(
        &self,
        task_uuid: &TaskUuid,
        update: StatusUpdate,
    ) -> Result<TaskState, StateError> {
        let mut records = self.records.write().await;
        let state = records
            .tasks
            .get_mut(task_uuid)
            .ok_or_else(|| StateError::NotFound(format!("task {task_uuid}")))?;

        let (from, to) = (state.status(), update.status());
        if !from.can_transition_to(to) {
            warn!(task_uuid = %task_uuid, from = %from, to = %to, "Transition rejected");
            return Err(StateError::Conflict(format!(
                "task {task_uuid}: {from} -> {to} not allowed"
            )));
        }

        state.apply(update);
        state.touch(Utc::now());
        debug!(task_uuid = %task_uuid, from = %from, to = %to, "Task updated");
        Ok(state.clone())
    }

    pub async fn fetch_task(&self, task_uuid: &TaskUuid) -> Result<TaskState, StateError> {
        self.records
            .read()
            .await
            .tasks
            .get(task_uuid)
            .cloned()
            .ok_or_else(|| StateError::NotFound(format!("task {task_uuid}")))
    }

    /// Known records among `task_uuids`, in request order. Unknown ids are
    /// skipped.
    pub async fn fetch_tasks(&self, task_uuids: &[TaskUuid]) -> Result<Vec<TaskState>, StateError> {
        if task_uuids.is_empty() {
            return Err(StateError::InvalidArgument(
                "bulk fetch needs at least one task uuid".to_string(),
            ));
        }
        let records = self.records.read().await;
        Ok(task_uuids
            .iter()
            .filter_map(|uuid| records.tasks.get(uuid).cloned())
            .collect())
    }

    pub async fn delete_task(&self, task_uuid: &TaskUuid) -> Result<(), StateError> {
        self.records
            .write()
            .await
            .tasks
            .remove(task_uuid)
            .map(|_| ())
            .ok_or_else(|| StateError::NotFound(format!("task {task_uuid}")))
    }

    pub async fn create_group(
        &self,
        group_uuid: &GroupUuid,
        task_uuids: &[TaskUuid],
    ) -> Result<GroupMeta, StateError> {
        if group_uuid.is_empty() {
            return Err(StateError::InvalidArgument("group uuid is empty".to_string()));
        }

        let mut records = self.records.write().await;
        if records.groups.contains_key(group_uuid) {
            return Err(StateError::Conflict(format!("group {group_uuid} already exists")));
        }

        let mut group = GroupMeta::new(group_uuid.clone(), task_uuids.to_vec());
        group.created_at = Some(Utc::now());
        records.groups.insert(group_uuid.clone(), group.clone());
        debug!(group_uuid = %group_uuid, members = task_uuids.len(), "Group created");
        Ok(group)
    }

    pub async fn fetch_group(&self, group_uuid: &GroupUuid) -> Result<GroupMeta, StateError> {
        self.records
            .read()
            .await
            .groups
            .get(group_uuid)
            .cloned()
            .ok_or_else(|| StateError::NotFound(format!("group {group_uuid}")))
    }

    /// Flip the chord latch under the write lock. True only for the flipping
    /// call.
    pub async fn latch_chord(&self, group_uuid: &GroupUuid) -> Result<bool, StateError> {
        let mut records = self.records.write().await;
        let group = records
            .groups
            .get_mut(group_uuid)
            .ok_or_else(|| StateError::NotFound(format!("group {group_uuid}")))?;
        Ok(group.latch_chord())
    }

    pub async fn delete_group(&self, group_uuid: &GroupUuid) -> Result<(), StateError> {
        self.records
            .write()
            .await
            .groups
            .remove(group_uuid)
            .map(|_| ())
            .ok_or_else(|| StateError::NotFound(format!("group {group_uuid}")))
    }

    /// Get the number of task records.
    pub async fn task_count(&self) -> usize {
        self.records.read().await.tasks.len()
    }

    /// Get the number of group records.
    pub async fn group_count(&self) -> usize {
        self.records.read().await.groups.len()
    }
}

#[async_trait]
impl Backend for MemoryBackend {
    async fn init_group(
        &self,
        group_uuid: &GroupUuid,
        task_uuids: &[TaskUuid],
    ) -> Result<(), StateError> {
        self.create_group(group_uuid, task_uuids).await.map(|_| ())
    }

    async fn mark_pending(&self, signature: &TaskSignature) -> Result<(), StateError> {
        self.create_task(signature).await.map(|_| ())
    }

    async fn update_status(
        &self,
        task_uuid: &TaskUuid,
        update: StatusUpdate,
    ) -> Result<(), StateError> {
        self.update_task(task_uuid, update).await.map(|_| ())
    }

    async fn get_state(&self, task_uuid: &TaskUuid) -> Result<TaskState, StateError> {
        self.fetch_task(task_uuid).await
    }

    async fn group_task_states(
        &self,
        group_uuid: &GroupUuid,
        _expected_count: usize,
    ) -> Result<Vec<TaskState>, StateError> {
        let group = self.fetch_group(group_uuid).await?;
        if group.task_uuids.is_empty() {
            return Ok(Vec::new());
        }
        self.fetch_tasks(&group.task_uuids).await
    }

    async fn trigger_chord(&self, group_uuid: &GroupUuid) -> Result<bool, StateError> {
        let flipped = self.latch_chord(group_uuid).await?;
        if flipped {
            info!(group_uuid = %group_uuid, "Chord claimed");
        }
        Ok(flipped)
    }

    async fn purge_state(&self, task_uuid: &TaskUuid) -> Result<(), StateError> {
        self.delete_task(task_uuid).await
    }

    async fn purge_group(&self, group_uuid: &GroupUuid) -> Result<(), StateError> {
        self.delete_group(group_uuid).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use taskstate_core::TaskResult;

    fn signature(id: &str) -> TaskSignature {
        TaskSignature::new(id, "add").in_group("g1")
    }

    /// Create group g1 with the given members, all PENDING.
    async fn group_of(backend: &MemoryBackend, ids: &[&str]) -> Vec<TaskSignature> {
        let signatures: Vec<_> = ids.iter().map(|id| signature(id)).collect();
        let uuids: Vec<_> = signatures.iter().map(|s| s.uuid.clone()).collect();
        backend.init_group(&GroupUuid::new("g1"), &uuids).await.unwrap();
        for sig in &signatures {
            backend.mark_pending(sig).await.unwrap();
        }
        signatures
    }

    async fn run_to_started(backend: &MemoryBackend, sig: &TaskSignature) {
        backend.mark_received(sig).await.unwrap();
        backend.mark_started(sig).await.unwrap();
    }

    #[tokio::test]
    async fn test_success_lifecycle() {
        let backend = MemoryBackend::new();
        let sig = signature("t1");

        backend.mark_pending(&sig).await.unwrap();
        run_to_started(&backend, &sig).await;
        backend
            .mark_success(&sig, vec![TaskResult::new("int", 42)])
            .await
            .unwrap();

        let state = backend.get_state(&sig.uuid).await.unwrap();
        assert_eq!(state.status(), TaskStatus::Success);
        assert_eq!(state.results(), Some(&[TaskResult::new("int", 42)][..]));
        assert_eq!(state.task_name(), "add");
        assert!(state.created_at().is_some());
    }

    #[tokio::test]
    async fn test_failure_retry_cycle() {
        let backend = MemoryBackend::new();
        let sig = signature("t1");

        backend.mark_pending(&sig).await.unwrap();
        run_to_started(&backend, &sig).await;
        backend.mark_failure(&sig, "division by zero").await.unwrap();
        assert_eq!(
            backend.get_state(&sig.uuid).await.unwrap().error(),
            Some("division by zero")
        );

        backend.mark_retry(&sig).await.unwrap();
        backend.mark_pending(&sig).await.unwrap();
        run_to_started(&backend, &sig).await;
        backend.mark_success(&sig, Vec::new()).await.unwrap();

        let state = backend.get_state(&sig.uuid).await.unwrap();
        assert_eq!(state.status(), TaskStatus::Success);
        assert_eq!(state.error(), None);
    }

    #[tokio::test]
    async fn test_out_of_order_transitions_conflict() {
        let backend = MemoryBackend::new();
        let sig = signature("t1");

        backend.mark_pending(&sig).await.unwrap();
        run_to_started(&backend, &sig).await;
        backend.mark_success(&sig, Vec::new()).await.unwrap();

        assert!(backend.mark_pending(&sig).await.unwrap_err().is_conflict());
        assert!(backend.mark_started(&sig).await.unwrap_err().is_conflict());
        assert!(backend.mark_retry(&sig).await.unwrap_err().is_conflict());
        assert_eq!(
            backend.get_state(&sig.uuid).await.unwrap().status(),
            TaskStatus::Success
        );
    }

    #[tokio::test]
    async fn test_replayed_events_are_accepted() {
        let backend = MemoryBackend::new();
        let sig = signature("t1");

        backend.mark_pending(&sig).await.unwrap();
        backend.mark_pending(&sig).await.unwrap();
        run_to_started(&backend, &sig).await;
        backend.mark_started(&sig).await.unwrap();
        assert_eq!(backend.task_count().await, 1);
    }

    #[tokio::test]
    async fn test_update_unknown_task_is_not_found() {
        let backend = MemoryBackend::new();
        let err = backend.mark_received(&signature("ghost")).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_group_complete_with_mixed_outcomes() {
        let backend = MemoryBackend::new();
        let sigs = group_of(&backend, &["t1", "t2", "t3"]).await;
        let group = GroupUuid::new("g1");

        for sig in &sigs {
            run_to_started(&backend, sig).await;
        }
        backend.mark_success(&sigs[0], Vec::new()).await.unwrap();
        backend.mark_success(&sigs[1], Vec::new()).await.unwrap();
        assert!(!backend.group_completed(&group, 3).await.unwrap());

        backend.mark_failure(&sigs[2], "boom").await.unwrap();
        assert!(backend.group_completed(&group, 3).await.unwrap());

        let states = backend.group_task_states(&group, 3).await.unwrap();
        let ids: Vec<_> = states.iter().map(|s| s.task_uuid().as_str()).collect();
        assert_eq!(ids, vec!["t1", "t2", "t3"]);
    }

    #[tokio::test]
    async fn test_retry_does_not_count_as_completed() {
        let backend = MemoryBackend::new();
        let sigs = group_of(&backend, &["t1", "t2"]).await;

        for sig in &sigs {
            run_to_started(&backend, sig).await;
            backend.mark_failure(sig, "boom").await.unwrap();
        }
        backend.mark_retry(&sigs[1]).await.unwrap();

        assert!(!backend.group_completed(&GroupUuid::new("g1"), 2).await.unwrap());
    }

    #[tokio::test]
    async fn test_unknown_group_is_not_found() {
        let backend = MemoryBackend::new();
        let group = GroupUuid::new("nope");

        assert!(backend.group_completed(&group, 1).await.unwrap_err().is_not_found());
        assert!(backend.trigger_chord(&group).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_empty_group() {
        let backend = MemoryBackend::new();
        group_of(&backend, &[]).await;
        let group = GroupUuid::new("g1");

        assert!(backend.group_task_states(&group, 0).await.unwrap().is_empty());
        assert!(backend.group_completed(&group, 0).await.unwrap());
    }

    #[tokio::test]
    async fn test_duplicate_group_conflicts() {
        let backend = MemoryBackend::new();
        group_of(&backend, &["t1"]).await;
        let err = backend
            .init_group(&GroupUuid::new("g1"), &[TaskUuid::new("t9")])
            .await
            .unwrap_err();
        assert!(err.is_conflict());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_chord_trigger_claims_once() {
        let backend = MemoryBackend::new();
        group_of(&backend, &["t1", "t2"]).await;

        let mut handles = Vec::new();
        for _ in 0..32 {
            let backend = backend.clone();
            handles.push(tokio::spawn(async move {
                backend.trigger_chord(&GroupUuid::new("g1")).await
            }));
        }

        let mut claimed = 0;
        for handle in handles {
            if handle.await.unwrap().unwrap() {
                claimed += 1;
            }
        }
        assert_eq!(claimed, 1);
        assert!(backend.fetch_group(&GroupUuid::new("g1")).await.unwrap().chord_triggered);
    }

    #[tokio::test]
    async fn test_purge_removes_records() {
        let backend = MemoryBackend::new();
        let sigs = group_of(&backend, &["t1"]).await;

        backend.purge_state(&sigs[0].uuid).await.unwrap();
        assert!(backend.get_state(&sigs[0].uuid).await.unwrap_err().is_not_found());
        assert!(backend.purge_state(&sigs[0].uuid).await.unwrap_err().is_not_found());

        backend.purge_group(&GroupUuid::new("g1")).await.unwrap();
        assert_eq!(backend.group_count().await, 0);
    }

    #[tokio::test]
    async fn test_bulk_fetch_skips_unknown_and_rejects_empty() {
        let backend = MemoryBackend::new();
        backend.mark_pending(&signature("t1")).await.unwrap();

        let states = backend
            .fetch_tasks(&[TaskUuid::new("missing"), TaskUuid::new("t1")])
            .await
            .unwrap();
        assert_eq!(states.len(), 1);

        let err = backend.fetch_tasks(&[]).await.unwrap_err();
        assert!(matches!(err, StateError::InvalidArgument(_)));
    }
}

//! Task state snapshots and partial status updates.
//!
//! Both types keep the payload invariant closed: `results` exist only on
//! SUCCESS and `error` exists exactly on FAILURE. Constructors enforce it and
//! deserialization goes through the same check, so a value of either type
//! that violates it cannot be observed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{GroupUuid, StateError, TaskSignature, TaskStatus, TaskUuid};

/// A single typed result value produced by a successful task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskResult {
    /// Type tag understood by the execution engine (e.g. "int", "string").
    #[serde(rename = "type")]
    pub kind: String,
    pub value: serde_json::Value,
}

impl TaskResult {
    pub fn new(kind: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        Self {
            kind: kind.into(),
            value: value.into(),
        }
    }
}

fn check_payload(
    status: TaskStatus,
    results: &Option<Vec<TaskResult>>,
    error: &Option<String>,
) -> Result<(), StateError> {
    if results.is_some() && status != TaskStatus::Success {
        return Err(StateError::InvalidArgument(format!(
            "results are only allowed on SUCCESS, got {status}"
        )));
    }
    match (status, error) {
        (TaskStatus::Failure, None) => Err(StateError::InvalidArgument(
            "FAILURE requires an error message".to_string(),
        )),
        (TaskStatus::Failure, Some(_)) | (_, None) => Ok(()),
        (other, Some(_)) => Err(StateError::InvalidArgument(format!(
            "error is only allowed on FAILURE, got {other}"
        ))),
    }
}

/// Partial update of a task's mutable fields (everything but creation).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawStatusUpdate")]
pub struct StatusUpdate {
    status: TaskStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    results: Option<Vec<TaskResult>>,
}

impl StatusUpdate {
    /// Build an update, checking the payload invariant.
    pub fn new(
        status: TaskStatus,
        results: Option<Vec<TaskResult>>,
        error: Option<String>,
    ) -> Result<Self, StateError> {
        let results = match (status, results) {
            (TaskStatus::Success, None) => Some(Vec::new()),
            (_, results) => results,
        };
        check_payload(status, &results, &error)?;
        Ok(Self {
            status,
            error,
            results,
        })
    }

    fn bare(status: TaskStatus) -> Self {
        Self {
            status,
            error: None,
            results: None,
        }
    }

    pub fn pending() -> Self {
        Self::bare(TaskStatus::Pending)
    }

    pub fn received() -> Self {
        Self::bare(TaskStatus::Received)
    }

    pub fn started() -> Self {
        Self::bare(TaskStatus::Started)
    }

    pub fn retry() -> Self {
        Self::bare(TaskStatus::Retry)
    }

    pub fn success(results: Vec<TaskResult>) -> Self {
        Self {
            status: TaskStatus::Success,
            error: None,
            results: Some(results),
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            status: TaskStatus::Failure,
            error: Some(error.into()),
            results: None,
        }
    }

    pub fn status(&self) -> TaskStatus {
        self.status
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn results(&self) -> Option<&[TaskResult]> {
        self.results.as_deref()
    }
}

#[derive(Deserialize)]
struct RawStatusUpdate {
    status: TaskStatus,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    results: Option<Vec<TaskResult>>,
}

impl TryFrom<RawStatusUpdate> for StatusUpdate {
    type Error = StateError;

    fn try_from(raw: RawStatusUpdate) -> Result<Self, Self::Error> {
        Self::new(raw.status, raw.results, raw.error)
    }
}

/// Snapshot of a task record as held by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawTaskState")]
pub struct TaskState {
    task_uuid: TaskUuid,
    task_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    group_uuid: Option<GroupUuid>,
    status: TaskStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    results: Option<Vec<TaskResult>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    updated_at: Option<DateTime<Utc>>,
}

impl TaskState {
    /// Fresh PENDING record for a dispatched signature.
    pub fn pending(signature: &TaskSignature) -> Self {
        Self {
            task_uuid: signature.uuid.clone(),
            task_name: signature.name.clone(),
            group_uuid: signature.group_uuid.clone(),
            status: TaskStatus::Pending,
            error: None,
            results: None,
            created_at: None,
            updated_at: None,
        }
    }

    /// Overwrite the mutable fields with `update`.
    ///
    /// Transition validity is the store's concern and is not checked here.
    pub fn apply(&mut self, update: StatusUpdate) {
        self.status = update.status;
        self.error = update.error;
        self.results = update.results;
    }

    /// Record a store write at `now`.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.created_at.get_or_insert(now);
        self.updated_at = Some(now);
    }

    pub fn task_uuid(&self) -> &TaskUuid {
        &self.task_uuid
    }

    pub fn task_name(&self) -> &str {
        &self.task_name
    }

    pub fn group_uuid(&self) -> Option<&GroupUuid> {
        self.group_uuid.as_ref()
    }

    pub fn status(&self) -> TaskStatus {
        self.status
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn results(&self) -> Option<&[TaskResult]> {
        self.results.as_deref()
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }

    /// Check if the task reached SUCCESS or FAILURE.
    pub fn is_completed(&self) -> bool {
        self.status.is_terminal()
    }
}

#[derive(Deserialize)]
struct RawTaskState {
    task_uuid: TaskUuid,
    #[serde(default)]
    task_name: String,
    #[serde(default)]
    group_uuid: Option<String>,
    status: TaskStatus,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    results: Option<Vec<TaskResult>>,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    updated_at: Option<DateTime<Utc>>,
}

impl TryFrom<RawTaskState> for TaskState {
    type Error = StateError;

    fn try_from(raw: RawTaskState) -> Result<Self, Self::Error> {
        if raw.task_uuid.is_empty() {
            return Err(StateError::InvalidArgument("task_uuid is empty".to_string()));
        }
        // The wire uses "" for tasks outside any group.
        let group_uuid = raw.group_uuid.filter(|g| !g.is_empty()).map(GroupUuid::from);
        let update = StatusUpdate::new(raw.status, raw.results, raw.error)?;

        Ok(Self {
            task_uuid: raw.task_uuid,
            task_name: raw.task_name,
            group_uuid,
            status: update.status,
            error: update.error,
            results: update.results,
            created_at: raw.created_at,
            updated_at: raw.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn signature() -> TaskSignature {
        TaskSignature::new("t1", "add").in_group("g1")
    }

    #[test]
    fn test_pending_snapshot() {
        let state = TaskState::pending(&signature());
        assert_eq!(state.status(), TaskStatus::Pending);
        assert_eq!(state.group_uuid().map(|g| g.as_str()), Some("g1"));
        assert_eq!(state.results(), None);
        assert_eq!(state.error(), None);
    }

    #[test]
    fn test_apply_clears_previous_payload() {
        let mut state = TaskState::pending(&signature());
        state.apply(StatusUpdate::failure("boom"));
        assert_eq!(state.error(), Some("boom"));

        state.apply(StatusUpdate::retry());
        assert_eq!(state.status(), TaskStatus::Retry);
        assert_eq!(state.error(), None);
    }

    #[test]
    fn test_update_invariants() {
        assert!(StatusUpdate::new(TaskStatus::Failure, None, None).is_err());
        assert!(StatusUpdate::new(TaskStatus::Started, None, Some("x".into())).is_err());
        assert!(StatusUpdate::new(TaskStatus::Retry, Some(vec![]), None).is_err());

        let success = StatusUpdate::new(TaskStatus::Success, None, None).unwrap();
        assert_eq!(success.results(), Some(&[][..]));
    }

    #[test]
    fn test_update_wire_format() {
        let update = StatusUpdate::success(vec![TaskResult::new("int", 42)]);
        assert_eq!(
            serde_json::to_value(&update).unwrap(),
            json!({"status": "SUCCESS", "results": [{"type": "int", "value": 42}]})
        );

        let rejected =
            serde_json::from_value::<StatusUpdate>(json!({"status": "STARTED", "error": "x"}));
        assert!(rejected.is_err());
    }

    #[test]
    fn test_state_decodes_store_payload() {
        let state: TaskState = serde_json::from_value(json!({
            "task_uuid": "t1",
            "task_name": "add",
            "group_uuid": "",
            "status": "SUCCESS",
            "results": [{"type": "int", "value": 42}],
            "created_at": "2024-05-01T10:00:00Z",
            "updated_at": "2024-05-01T10:00:05Z"
        }))
        .unwrap();

        assert_eq!(state.group_uuid(), None);
        assert!(state.is_completed());
        assert_eq!(state.results().unwrap()[0], TaskResult::new("int", 42));
        assert!(state.created_at().unwrap() < state.updated_at().unwrap());
    }

    #[test]
    fn test_state_rejects_error_without_failure() {
        let result = serde_json::from_value::<TaskState>(json!({
            "task_uuid": "t1",
            "task_name": "add",
            "status": "SUCCESS",
            "error": "should not be here"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_touch_keeps_creation_time() {
        let mut state = TaskState::pending(&signature());
        let first = Utc::now();
        state.touch(first);
        let later = first + chrono::Duration::seconds(3);
        state.touch(later);
        assert_eq!(state.created_at(), Some(first));
        assert_eq!(state.updated_at(), Some(later));
    }
}

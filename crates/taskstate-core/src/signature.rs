//! Task reference handed over by the execution engine.

use serde::{Deserialize, Serialize};

use crate::{GroupUuid, TaskUuid};

/// The part of a task signature the state backend cares about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskSignature {
    pub uuid: TaskUuid,
    pub name: String,
    pub group_uuid: Option<GroupUuid>,
}

impl TaskSignature {
    /// Create a signature for a task outside any group.
    pub fn new(uuid: impl Into<TaskUuid>, name: impl Into<String>) -> Self {
        Self {
            uuid: uuid.into(),
            name: name.into(),
            group_uuid: None,
        }
    }

    /// Builder method to place the task in a group.
    pub fn in_group(mut self, group_uuid: impl Into<GroupUuid>) -> Self {
        self.group_uuid = Some(group_uuid.into());
        self
    }
}

//! Group metadata and the chord latch.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{GroupUuid, TaskUuid};

/// Record describing a group of tasks and whether its chord callback fired.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupMeta {
    pub group_uuid: GroupUuid,

    /// Members in dispatch order. Fixed when the group is created.
    pub task_uuids: Vec<TaskUuid>,

    /// One-way latch, see [`GroupMeta::latch_chord`].
    #[serde(default)]
    pub chord_triggered: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl GroupMeta {
    pub fn new(group_uuid: GroupUuid, task_uuids: Vec<TaskUuid>) -> Self {
        Self {
            group_uuid,
            task_uuids,
            chord_triggered: false,
            created_at: None,
        }
    }

    pub fn task_count(&self) -> usize {
        self.task_uuids.len()
    }

    /// Flip the chord latch. Returns true only for the call that flipped it.
    ///
    /// Stores call this while holding exclusive access to the record.
    pub fn latch_chord(&mut self) -> bool {
        if self.chord_triggered {
            return false;
        }
        self.chord_triggered = true;
        true
    }
}

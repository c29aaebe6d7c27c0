//! Task lifecycle status and its transition table.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::StateError;

/// Status of a task in the store.
///
/// ```text
/// PENDING -> RECEIVED -> STARTED -> SUCCESS
///                           |   \-> FAILURE
///                           v          |
///                         RETRY <------/
///                           |
///                           \-> PENDING | RECEIVED
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    /// Task signature dispatched, waiting in the broker.
    #[default]
    Pending,
    /// Task delivered to a worker.
    Received,
    /// Worker began executing the task.
    Started,
    /// Execution failed and the engine scheduled another attempt.
    Retry,
    /// Task finished with results.
    Success,
    /// Task finished with an error.
    Failure,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 6] = [
        Self::Pending,
        Self::Received,
        Self::Started,
        Self::Retry,
        Self::Success,
        Self::Failure,
    ];

    /// Returns true for SUCCESS and FAILURE. These are the only states that
    /// count towards group completion.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Success | Self::Failure)
    }

    /// Returns true if a store holding `self` should accept `next`.
    ///
    /// Re-applying the current status is accepted so lifecycle events can be
    /// replayed after a timeout of unknown outcome.
    pub fn can_transition_to(&self, next: TaskStatus) -> bool {
        use TaskStatus::*;

        if *self == next {
            return true;
        }
        matches!(
            (self, next),
            (Pending, Received | Started)
                | (Received, Started | Failure)
                | (Started, Success | Failure | Retry)
                | (Failure, Retry)
                | (Retry, Pending | Received)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Received => "RECEIVED",
            Self::Started => "STARTED",
            Self::Retry => "RETRY",
            Self::Success => "SUCCESS",
            Self::Failure => "FAILURE",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = StateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| StateError::InvalidArgument(format!("unknown task status '{s}'")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_states() {
        let terminal: Vec<_> = TaskStatus::ALL.into_iter().filter(|s| s.is_terminal()).collect();
        assert_eq!(terminal, vec![TaskStatus::Success, TaskStatus::Failure]);
    }

    #[test]
    fn test_happy_path_transitions() {
        use TaskStatus::*;
        let path = [
            Pending, Received, Started, Failure, Retry, Pending, Received, Started, Success,
        ];
        for pair in path.windows(2) {
            assert!(pair[0].can_transition_to(pair[1]), "{} -> {}", pair[0], pair[1]);
        }
    }

    #[test]
    fn test_success_is_final() {
        for next in TaskStatus::ALL {
            let allowed = TaskStatus::Success.can_transition_to(next);
            assert_eq!(allowed, next == TaskStatus::Success, "SUCCESS -> {next}");
        }
    }

    #[test]
    fn test_no_backwards_moves() {
        assert!(!TaskStatus::Started.can_transition_to(TaskStatus::Pending));
        assert!(!TaskStatus::Received.can_transition_to(TaskStatus::Pending));
        assert!(!TaskStatus::Failure.can_transition_to(TaskStatus::Started));
        assert!(!TaskStatus::Pending.can_transition_to(TaskStatus::Success));
    }

    #[test]
    fn test_wire_format() {
        assert_eq!(serde_json::to_string(&TaskStatus::Retry).unwrap(), "\"RETRY\"");
        let parsed: TaskStatus = serde_json::from_str("\"STARTED\"").unwrap();
        assert_eq!(parsed, TaskStatus::Started);
        assert_eq!("failure".parse::<TaskStatus>().unwrap(), TaskStatus::Failure);
        assert!("DONE".parse::<TaskStatus>().is_err());
    }
}

//! Taskstate Core Domain Types
//!
//! This crate contains the task/group state model shared by every backend
//! variant, with no dependencies on:
//! - HTTP clients or servers
//! - Storage engines
//! - Runtime specifics
//!
//! The remote store owns every record described here; these types only
//! describe what gets sent and what comes back.

pub mod error;
pub mod group;
pub mod ids;
pub mod signature;
pub mod status;
pub mod task;

// Re-export commonly used types
pub use error::StateError;
pub use group::GroupMeta;
pub use ids::{GroupUuid, TaskUuid};
pub use signature::TaskSignature;
pub use status::TaskStatus;
pub use task::{StatusUpdate, TaskResult, TaskState};

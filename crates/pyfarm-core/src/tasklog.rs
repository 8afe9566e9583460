//! Task logs: opaque on-disk identifiers, associated with tasks per attempt.

use serde::{Deserialize, Serialize};

use crate::task::TaskId;

/// An opaque, filesystem-safe identifier naming a log file under
/// `LOGFILES_DIR`, optionally `.gz`-compressed. Not a surrogate key, so it
/// does not use [`crate::define_id!`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskLogIdentifier(String);

impl TaskLogIdentifier {
    pub fn new(identifier: impl Into<String>) -> Self {
        Self(identifier.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TaskLogIdentifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Links a task's attempt number to the log that recorded it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskLogAssociation {
    pub task_id: TaskId,
    pub attempt: u32,
    pub identifier: TaskLogIdentifier,
}

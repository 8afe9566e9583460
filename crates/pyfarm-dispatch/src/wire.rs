//! JSON bodies exchanged with an agent's HTTP control surface.

use std::collections::HashMap;

use pyfarm_core::job::JobId;
use pyfarm_core::task::TaskId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize)]
pub struct AssignRequest {
    pub job: JobPayload,
    pub jobtype: JobTypePayload,
    pub tasks: Vec<TaskPayload>,
}

#[derive(Debug, Clone, Serialize)]
pub struct JobPayload {
    pub id: JobId,
    pub title: String,
    pub data: serde_json::Value,
    pub environ: HashMap<String, String>,
    pub by: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct JobTypePayload {
    pub name: String,
    pub version: i32,
}

#[derive(Debug, Clone, Serialize)]
pub struct TaskPayload {
    pub id: TaskId,
    pub frame: i64,
    pub attempt: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct UpdateRequest {
    pub version: String,
}

/// One task as reported by an agent's `GET /tasks/`, used by the poller to
/// reconcile what the agent thinks it's holding against the store.
#[derive(Debug, Clone, Deserialize)]
pub struct AgentTaskSummary {
    pub id: TaskId,
}

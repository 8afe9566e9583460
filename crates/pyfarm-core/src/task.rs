//! Task: one unit of work, child of exactly one job.

use serde::{Deserialize, Serialize};

use crate::agent::AgentId;
use crate::job::JobId;

crate::define_id!(TaskId);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskState {
    Queued,
    Running,
    Done,
    Failed,
}

crate::simple_display! {
    TaskState {
        Queued => "queued",
        Running => "running",
        Done => "done",
        Failed => "failed",
    }
}

impl TaskState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub job_id: JobId,
    /// Fixed-point frame number, scaled by [`crate::job::FRAME_SCALE`].
    pub frame: i64,
    /// Inherited from the owning job at creation time.
    pub priority: i32,
    pub state: TaskState,
    pub attempts: u32,
    pub failures: u32,
    pub agent_id: Option<AgentId>,
    pub last_error: Option<String>,
    pub time_submitted: u64,
    pub time_started: Option<u64>,
    pub time_finished: Option<u64>,
}

impl Task {
    /// Whether this task could be picked up in a batch right now: not
    /// terminal, and either unassigned or assigned to an agent that is no
    /// longer able to hold it (offline/disabled).
    pub fn is_batchable(&self, assigned_agent_unavailable: bool) -> bool {
        !self.state.is_terminal() && (self.agent_id.is_none() || assigned_agent_unavailable)
    }
}

#[cfg(any(test, feature = "test-support"))]
crate::builder! {
    pub struct TaskBuilder => Task {
        set {
            id: TaskId = TaskId::from_raw(1),
            job_id: JobId = JobId::from_raw(1),
            frame: i64 = crate::job::FRAME_SCALE,
            priority: i32 = 0,
            state: TaskState = TaskState::Queued,
            attempts: u32 = 0,
            failures: u32 = 0,
            time_submitted: u64 = 0,
            time_started: Option<u64> = None,
            time_finished: Option<u64> = None,
        }
        option {
            agent_id: AgentId = None,
            last_error: String = None,
        }
    }
}

#[cfg(test)]
#[path = "task_tests.rs"]
mod tests;

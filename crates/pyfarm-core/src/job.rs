//! Job: a unit of scheduling work attached to exactly one job queue.

use serde::{Deserialize, Serialize};

use crate::jobqueue::JobQueueId;
use crate::jobtype::JobTypeVersionId;
use crate::software::SoftwareRequirement;

crate::define_id!(JobId);

/// Frame/`by` values are fixed-point, scaled by this factor, so contiguous
/// batch equality (`prev.frame + by == next.frame`) is exact rather than
/// floating-point-approximate. The original schema allows up to 4
/// fractional digits, hence a scale of 10,000.
pub const FRAME_SCALE: i64 = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobState {
    Queued,
    Paused,
    Running,
    Done,
    Failed,
}

crate::simple_display! {
    JobState {
        Queued => "queued",
        Paused => "paused",
        Running => "running",
        Done => "done",
        Failed => "failed",
    }
}

impl JobState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub jobqueue_id: JobQueueId,
    pub jobtype_version_id: JobTypeVersionId,

    pub title: String,
    pub state: JobState,
    pub priority: i32,
    pub weight: u32,

    /// Maximum tasks per `/assign` batch for this job.
    pub batch: u32,
    /// Frame step, fixed-point scaled by [`FRAME_SCALE`].
    pub by: i64,
    /// RAM required per task, in megabytes.
    pub ram: u32,
    /// Maximum failed attempts per task before the failure is permanent.
    pub requeue: u32,

    pub minimum_agents: Option<u32>,
    pub maximum_agents: Option<u32>,

    pub time_submitted: u64,
    pub time_started: Option<u64>,
    pub time_finished: Option<u64>,

    pub parents: Vec<JobId>,
    pub to_be_deleted: bool,
    pub output_link: Option<String>,
    pub notified_users: Vec<String>,
    pub software_requirements: Vec<SoftwareRequirement>,

    /// Free-form job-type-specific payload, forwarded to the agent verbatim
    /// in the `/assign` body.
    pub data: serde_json::Value,
    /// Environment variables the agent should set before running a task.
    pub environ: std::collections::HashMap<String, String>,
}

impl Job {
    pub fn effective_weight(&self) -> f64 {
        if self.weight == 0 {
            1.0
        } else {
            self.weight as f64
        }
    }

    pub fn is_unbounded(&self) -> bool {
        self.maximum_agents.is_none()
    }

    /// Whether this job is eligible to be scheduled at all: running or
    /// queued, with every parent already done.
    pub fn is_runnable(&self, parents_done: bool) -> bool {
        matches!(self.state, JobState::Running | JobState::Queued) && parents_done
    }
}

#[cfg(any(test, feature = "test-support"))]
crate::builder! {
    pub struct JobBuilder => Job {
        set {
            id: JobId = JobId::from_raw(1),
            jobqueue_id: JobQueueId = JobQueueId::from_raw(1),
            jobtype_version_id: JobTypeVersionId = JobTypeVersionId::from_raw(1),
            state: JobState = JobState::Queued,
            priority: i32 = 0,
            weight: u32 = 1,
            batch: u32 = 1,
            by: i64 = FRAME_SCALE,
            ram: u32 = 0,
            requeue: u32 = 0,
            minimum_agents: Option<u32> = None,
            maximum_agents: Option<u32> = None,
            time_submitted: u64 = 0,
            time_started: Option<u64> = None,
            time_finished: Option<u64> = None,
            to_be_deleted: bool = false,
        }
        into {
            title: String = "test-job",
        }
        option {
            output_link: String = None,
        }
        computed {
            parents: Vec<JobId> = Vec::new(),
            notified_users: Vec<String> = Vec::new(),
            software_requirements: Vec<SoftwareRequirement> = Vec::new(),
            data: serde_json::Value = serde_json::Value::Null,
            environ: std::collections::HashMap<String, String> = std::collections::HashMap::new(),
        }
    }
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;

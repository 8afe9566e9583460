//! In-memory entity store.
//!
//! `EntityStore` holds one `RwLock<Inner>` guarding every entity table. Every
//! public method takes the lock exactly once and performs its read-modify-write
//! in that single critical section, which is what stands in here for "a unit
//! of work begins with a commit barrier and performs its own read-modify-write
//! in a single transaction": there is only one writer at a time, and every
//! method either fully applies or fully rejects its change.

pub mod agents;
pub mod jobqueues;
pub mod jobs;
pub mod jobtypes;
pub mod software;
pub mod tasklogs;
pub mod tasks;

use std::collections::HashMap;

use parking_lot::RwLock;

use pyfarm_core::agent::{Agent, AgentId};
use pyfarm_core::job::{Job, JobId};
use pyfarm_core::jobqueue::{JobQueue, JobQueueId};
use pyfarm_core::jobtype::{JobType, JobTypeId, JobTypeVersion, JobTypeVersionId};
use pyfarm_core::software::{Software, SoftwareId, SoftwareVersion, SoftwareVersionId};
use pyfarm_core::task::{Task, TaskId};
use pyfarm_core::tasklog::{TaskLogAssociation, TaskLogIdentifier};

#[derive(Default)]
pub(crate) struct Inner {
    pub agents: HashMap<AgentId, Agent>,
    pub agents_by_hostname_port: HashMap<(String, u16), AgentId>,
    pub next_agent_id: i64,

    pub software: HashMap<SoftwareId, Software>,
    pub software_by_name: HashMap<String, SoftwareId>,
    pub next_software_id: i64,

    pub software_versions: HashMap<SoftwareVersionId, SoftwareVersion>,
    pub next_software_version_id: i64,

    pub jobtypes: HashMap<JobTypeId, JobType>,
    pub next_jobtype_id: i64,

    pub jobtype_versions: HashMap<JobTypeVersionId, JobTypeVersion>,
    pub jobtype_versions_by_key: HashMap<(JobTypeId, i32), JobTypeVersionId>,
    pub next_jobtype_version_id: i64,

    pub jobqueues: HashMap<JobQueueId, JobQueue>,
    pub jobqueues_by_parent_name: HashMap<(Option<JobQueueId>, String), JobQueueId>,
    pub next_jobqueue_id: i64,

    pub jobs: HashMap<JobId, Job>,
    pub next_job_id: i64,

    pub tasks: HashMap<TaskId, Task>,
    pub next_task_id: i64,

    /// Known `TaskLog` metadata rows, independent of whether any
    /// association currently references them.
    pub tasklog_registry: std::collections::HashSet<TaskLogIdentifier>,
    pub tasklogs: Vec<TaskLogAssociation>,
}

/// The entity store: persistent model of queues, jobs, job-type versions,
/// tasks, agents, and software. Enforces uniqueness invariants on insert and
/// routes every task mutation through [`crate::lifecycle::apply_task_change`].
#[derive(Default)]
pub struct EntityStore {
    pub(crate) inner: RwLock<Inner>,
}

impl EntityStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;

//! Task lifecycle hooks, routed through one function so the whole sequence
//! commits atomically with the triggering change (see the module doc on
//! [`crate::state::EntityStore`]).

use pyfarm_core::job::{Job, JobId, JobState};
use pyfarm_core::task::{Task, TaskId, TaskState};

use crate::error::StoreError;
use crate::state::EntityStore;

/// A job that just reached a terminal state, for the caller to schedule a
/// completion notification for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompletionNotice {
    pub job_id: JobId,
    pub final_state: JobState,
}

#[derive(Debug, Clone)]
pub struct TaskChangeOutcome {
    pub task: Task,
    pub job: Job,
    pub notify: Option<CompletionNotice>,
}

/// Apply a caller-supplied mutation to one task and run the full hook
/// sequence against the result, atomically:
///
/// 1. Clear `last_error` if the task is now `done`.
/// 2. Stamp `time_started`/`time_finished` for the transition.
/// 3. Increment `failures` on a fresh transition into `failed`.
/// 4. Requeue: if `failed` and `attempts <= job.requeue`, reset `agent_id`
///    and cancel the transition back to `queued`.
/// 5. Roll the job up to `done`/`failed` if no sibling task remains
///    non-terminal, and return a [`CompletionNotice`] for it.
///
/// Separately, any change of `agent_id` to a non-null value increments
/// `attempts`, independent of whether `state` changed in the same call.
pub fn apply_task_change(
    store: &EntityStore,
    task_id: TaskId,
    now_ms: u64,
    mutate: impl FnOnce(&mut Task),
) -> Result<TaskChangeOutcome, StoreError> {
    let mut inner = store.inner.write();

    let before = inner.tasks.get(&task_id).cloned().ok_or_else(|| StoreError::not_found("Task", task_id))?;
    let mut after = before.clone();
    mutate(&mut after);

    if after.agent_id != before.agent_id && after.agent_id.is_some() {
        after.attempts += 1;
    }

    let job_id = after.job_id;
    let mut job = inner.jobs.get(&job_id).cloned().ok_or_else(|| StoreError::not_found("Job", job_id))?;

    if after.state != before.state {
        if after.state == TaskState::Done && after.last_error.is_some() {
            after.last_error = None;
        }

        if after.state == TaskState::Running && before.state != TaskState::Running {
            after.time_started = Some(now_ms);
        }
        if after.state.is_terminal() {
            after.time_finished = Some(now_ms);
        }

        if after.state == TaskState::Failed && before.state != TaskState::Failed {
            after.failures += 1;
        }

        if after.state == TaskState::Failed && after.attempts <= job.requeue {
            after.agent_id = None;
            after.state = TaskState::Queued;
            after.time_finished = None;
        }
    }

    let mut notify = None;
    if after.state.is_terminal() {
        let siblings_non_terminal =
            inner.tasks.values().any(|t| t.job_id == job_id && t.id != task_id && !t.state.is_terminal());
        if !siblings_non_terminal {
            let any_failed = after.state == TaskState::Failed
                || inner.tasks.values().any(|t| t.job_id == job_id && t.id != task_id && t.state == TaskState::Failed);
            job.state = if any_failed { JobState::Failed } else { JobState::Done };
            job.time_finished = Some(now_ms);
            notify = Some(CompletionNotice { job_id, final_state: job.state });
        }
    }

    inner.tasks.insert(task_id, after.clone());
    inner.jobs.insert(job_id, job.clone());

    Ok(TaskChangeOutcome { task: after, job, notify })
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;

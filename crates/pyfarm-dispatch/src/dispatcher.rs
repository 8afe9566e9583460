//! `send_tasks_to_agent`, `stop_task`, `delete_task`, `update_agent`: the
//! four ways the master reaches out to an agent over HTTP, and how each
//! response code is interpreted against the store.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use pyfarm_core::agent::{Agent, AgentId, AgentState, UseAddress};
use pyfarm_core::job::JobId;
use pyfarm_core::settings::Settings;
use pyfarm_core::task::{Task, TaskId, TaskState};
use pyfarm_store::{apply_task_change, EntityStore, StoreError};
use thiserror::Error;

use crate::client::{AgentClient, ClientError, StatusOnly};
use crate::wire::{AssignRequest, JobPayload, JobTypePayload, TaskPayload};

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error(transparent)]
    Store(#[from] StoreError),
    /// Agent is offline/disabled at dispatch time; caller logs and moves on.
    #[error("agent {0} is unavailable")]
    AgentUnavailable(AgentId),
    /// Network failure persisted through the retry budget.
    #[error("agent {0} unreachable: {1}")]
    AgentUnreachable(AgentId, String),
    /// A response code outside the documented success/retry set.
    #[error("unexpected response {status} from agent {agent}")]
    UnexpectedResponse { agent: AgentId, status: u16 },
}

/// Retry a fallible HTTP call up to `settings.dispatch_max_retries` times on
/// connection failure, with a doubling backoff starting at 200ms. Returns
/// the last connection error if every attempt failed.
async fn with_retries<F, Fut>(max_retries: u32, mut call: F) -> Result<StatusOnly, ClientError>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<StatusOnly, ClientError>>,
{
    let mut delay = Duration::from_millis(200);
    let mut attempt = 0;
    loop {
        match call().await {
            Ok(status) => return Ok(status),
            Err(err) => {
                if attempt >= max_retries {
                    return Err(err);
                }
                tracing::warn!(attempt, %err, "agent call failed, retrying");
                tokio::time::sleep(delay).await;
                delay *= 2;
                attempt += 1;
            }
        }
    }
}

fn dispatch_address(agent: &Agent) -> Option<(String, u16)> {
    agent.dispatch_address().map(|addr| (addr, agent.port))
}

/// Push every non-terminal task currently assigned to `agent_id`, one
/// `/assign` call per distinct job, per `spec.md` §4.5.
pub async fn send_tasks_to_agent(
    store: &EntityStore,
    client: &dyn AgentClient,
    settings: &Settings,
    now_ms: u64,
    agent_id: AgentId,
) -> Result<(), DispatchError> {
    let agent = store.get_agent(agent_id)?;
    if matches!(agent.state, AgentState::Offline | AgentState::Disabled) {
        return Err(DispatchError::AgentUnavailable(agent_id));
    }
    if agent.use_address == UseAddress::Passive {
        return Ok(());
    }
    let Some((address, port)) = dispatch_address(&agent) else {
        return Err(DispatchError::AgentUnavailable(agent_id));
    };

    let mut by_job: HashMap<JobId, Vec<Task>> = HashMap::new();
    for task in store.tasks_for_agent(agent_id) {
        if !task.state.is_terminal() {
            by_job.entry(task.job_id).or_default().push(task);
        }
    }

    for (job_id, tasks) in by_job {
        let job = store.get_job(job_id)?;
        let jtv = store.get_jobtype_version(job.jobtype_version_id)?;
        let jt = store.get_jobtype(jtv.jobtype_id)?;

        let request = AssignRequest {
            job: JobPayload { id: job.id, title: job.title.clone(), data: job.data.clone(), environ: job.environ.clone(), by: job.by },
            jobtype: JobTypePayload { name: jt.name, version: jtv.version },
            tasks: tasks.iter().map(|t| TaskPayload { id: t.id, frame: t.frame, attempt: t.attempts }).collect(),
        };

        let result = with_retries(settings.dispatch_max_retries, || client.assign(&address, port, &request)).await;

        match result {
            Ok(StatusOnly(200..=202)) => {}
            Ok(StatusOnly(503)) => {
                store.set_agent_state(agent_id, AgentState::Offline)?;
                for task in &tasks {
                    apply_task_change(store, task.id, now_ms, |t| {
                        t.agent_id = None;
                        t.attempts = t.attempts.saturating_sub(1);
                    })?;
                }
            }
            Ok(StatusOnly(status)) => {
                tracing::error!(agent = %agent_id, status, "unexpected /assign response");
                return Err(DispatchError::UnexpectedResponse { agent: agent_id, status });
            }
            Err(ClientError::Connection(message)) => {
                store.set_agent_state(agent_id, AgentState::Offline)?;
                return Err(DispatchError::AgentUnreachable(agent_id, message));
            }
        }
    }

    Ok(())
}

/// Stop one non-terminal, assigned task. A no-op for tasks that are already
/// terminal or unassigned.
pub async fn stop_task(
    store: &EntityStore,
    client: &dyn AgentClient,
    settings: &Settings,
    now_ms: u64,
    task_id: TaskId,
) -> Result<(), DispatchError> {
    let task = store.get_task(task_id)?;
    let Some(agent_id) = task.agent_id else { return Ok(()) };
    if task.state.is_terminal() {
        return Ok(());
    }

    let agent = store.get_agent(agent_id)?;
    if agent.use_address == UseAddress::Passive {
        return Ok(());
    }
    let Some((address, port)) = dispatch_address(&agent) else { return Ok(()) };

    let result = with_retries(settings.dispatch_max_retries, || client.stop_task(&address, port, task_id)).await;

    match result {
        Ok(StatusOnly(200 | 202 | 204 | 404)) => {
            apply_task_change(store, task_id, now_ms, |t| {
                t.agent_id = None;
                t.state = TaskState::Queued;
            })?;
            Ok(())
        }
        Ok(StatusOnly(status)) => Err(DispatchError::UnexpectedResponse { agent: agent_id, status }),
        Err(ClientError::Connection(message)) => {
            store.set_agent_state(agent_id, AgentState::Offline)?;
            Err(DispatchError::AgentUnreachable(agent_id, message))
        }
    }
}

/// Delete a task: contact its agent first if it's live and holding the
/// task, then remove it locally regardless of whether the agent could be
/// reached (deletion degrades gracefully, per `spec.md` §5). If the task's
/// job is `to_be_deleted`, schedules a deferred re-check once the task is
/// gone, per `spec.md` §4.7.
pub async fn delete_task(
    store: &Arc<EntityStore>,
    client: &dyn AgentClient,
    settings: &Settings,
    task_id: TaskId,
) -> Result<(), DispatchError> {
    let task = store.get_task(task_id)?;
    let job_id = task.job_id;
    let deferred_check = store.get_job(job_id).map(|j| j.to_be_deleted).unwrap_or(false);

    let Some(agent_id) = task.agent_id else {
        store.delete_task(task_id)?;
        defer_if_pending(store, deferred_check, job_id);
        return Ok(());
    };
    if task.state.is_terminal() {
        store.delete_task(task_id)?;
        defer_if_pending(store, deferred_check, job_id);
        return Ok(());
    }

    let agent = store.get_agent(agent_id)?;
    if agent.use_address == UseAddress::Passive {
        store.delete_task(task_id)?;
        defer_if_pending(store, deferred_check, job_id);
        return Ok(());
    }
    let Some((address, port)) = dispatch_address(&agent) else {
        store.delete_task(task_id)?;
        defer_if_pending(store, deferred_check, job_id);
        return Ok(());
    };

    let result = with_retries(settings.dispatch_max_retries, || client.stop_task(&address, port, task_id)).await;

    match result {
        Ok(StatusOnly(200 | 202 | 204 | 404)) => {
            store.delete_task(task_id)?;
            defer_if_pending(store, deferred_check, job_id);
            Ok(())
        }
        Ok(StatusOnly(status)) => Err(DispatchError::UnexpectedResponse { agent: agent_id, status }),
        Err(ClientError::Connection(message)) => {
            store.set_agent_state(agent_id, AgentState::Offline)?;
            store.delete_task(task_id)?;
            defer_if_pending(store, deferred_check, job_id);
            Err(DispatchError::AgentUnreachable(agent_id, message))
        }
    }
}

fn defer_if_pending(store: &Arc<EntityStore>, deferred_check: bool, job_id: JobId) {
    if deferred_check {
        schedule_deferred_deletion(Arc::clone(store), job_id);
    }
}

/// Schedule a re-check of `job_id`'s deferred deletion ~100ms out, papering
/// over read/write skew between the task-count check and this task's own
/// removal landing in the store. `delete_task`'s own `store.delete_task`
/// call already removes an empty `to_be_deleted` job synchronously, so this
/// is a redundant-by-construction safety net against a future store
/// implementation where that check isn't atomic with the removal.
pub fn schedule_deferred_deletion(store: Arc<EntityStore>, job_id: JobId) {
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        if store.delete_job_if_empty_and_pending(job_id) {
            tracing::info!(%job_id, "deferred deletion removed job");
        }
    });
}

/// Trigger an agent's self-update to `agent.upgrade_to`. A no-op if no
/// upgrade is pending.
pub async fn update_agent(
    store: &EntityStore,
    client: &dyn AgentClient,
    settings: &Settings,
    agent_id: AgentId,
) -> Result<(), DispatchError> {
    let agent = store.get_agent(agent_id)?;
    let Some(version) = agent.upgrade_to.clone() else { return Ok(()) };
    if agent.use_address == UseAddress::Passive {
        return Ok(());
    }
    let Some((address, port)) = dispatch_address(&agent) else {
        return Err(DispatchError::AgentUnavailable(agent_id));
    };

    let result = with_retries(settings.dispatch_max_retries, || client.update(&address, port, &version)).await;

    match result {
        Ok(StatusOnly(200 | 202)) => Ok(()),
        Ok(StatusOnly(status)) => Err(DispatchError::UnexpectedResponse { agent: agent_id, status }),
        Err(ClientError::Connection(message)) => {
            store.set_agent_state(agent_id, AgentState::Offline)?;
            Err(DispatchError::AgentUnreachable(agent_id, message))
        }
    }
}

#[cfg(test)]
#[path = "dispatcher_tests.rs"]
mod tests;

//! The scheduler tick: find idle online agents and try to hand each one a
//! batch of work, per `spec.md` §4.7.

use std::collections::HashSet;

use pyfarm_core::agent::AgentId;
use pyfarm_core::job::JobState;
use pyfarm_core::settings::Settings;
use pyfarm_core::task::TaskState;
use pyfarm_dispatch::{AgentClient, DispatchError};
use pyfarm_scheduler::{get_job_for_agent, select_batch_tasks, MatchSettings};
use pyfarm_store::{EntityStore, StoreError};
use thiserror::Error;

use crate::lifecycle::apply_task_change_and_notify;
use crate::locks::AgentLockRegistry;

#[derive(Debug, Error)]
pub enum TickError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Dispatch(#[from] DispatchError),
}

/// Every agent the scheduler tick should try this round: online, holding no
/// non-terminal task.
pub fn candidates(store: &EntityStore) -> Vec<AgentId> {
    store.idle_online_agents().into_iter().map(|a| a.id).collect()
}

/// Try to hand `agent_id` one batch of work. A no-op if the agent is
/// already busy, already locked by a concurrent tick, or nothing matches.
pub async fn assign_to_agent(
    store: &EntityStore,
    client: &dyn AgentClient,
    settings: &Settings,
    locks: &AgentLockRegistry,
    now_ms: u64,
    agent_id: AgentId,
) -> Result<(), TickError> {
    let Some(_guard) = locks.try_acquire(agent_id, std::time::Instant::now()) else {
        tracing::debug!(%agent_id, "agent lock contended, skipping this tick");
        return Ok(());
    };

    if !store.tasks_for_agent(agent_id).iter().all(|t| t.state.is_terminal()) {
        return Ok(());
    }

    let agent = store.get_agent(agent_id)?;
    let agent_software = store.software_versions_for_agent(agent_id)?;
    let match_settings = MatchSettings {
        use_total_ram_for_scheduling: settings.use_total_ram_for_scheduling,
        prefer_running_jobs: settings.prefer_running_jobs,
    };

    let mut unwanted = HashSet::new();
    loop {
        let root = store.read_subtree(None);
        let Some(job) = get_job_for_agent(store, &root, &agent, &agent_software, &match_settings, &unwanted)? else {
            return Ok(());
        };

        let batch = select_batch_tasks(store, &job)?;
        if batch.is_empty() {
            unwanted.insert(job.id);
            continue;
        }

        if job.state != JobState::Running {
            let mut running = job.clone();
            running.state = JobState::Running;
            store.update_job(running)?;
        }

        for task in &batch {
            apply_task_change_and_notify(store, settings, task.id, now_ms, |t| {
                t.agent_id = Some(agent_id);
                t.state = TaskState::Running;
            })?;
        }

        pyfarm_dispatch::send_tasks_to_agent(store, client, settings, now_ms, agent_id).await?;
        return Ok(());
    }
}

#[cfg(test)]
#[path = "tick_tests.rs"]
mod tests;

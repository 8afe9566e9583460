//! Agent poller: periodically asks agents what they think they're running,
//! and pushes a reconciliation `/assign` when the agent disagrees with the
//! store, per `spec.md` §4.7.

use std::collections::HashSet;

use pyfarm_core::agent::{Agent, AgentId, UseAddress};
use pyfarm_core::settings::Settings;
use pyfarm_dispatch::{AgentClient, ClientError, DispatchError};
use pyfarm_store::EntityStore;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PollError {
    #[error(transparent)]
    Store(#[from] pyfarm_store::StoreError),
    #[error(transparent)]
    Dispatch(#[from] DispatchError),
}

fn is_due(agent: &Agent, now_ms: u64, interval_ms: u64) -> bool {
    match agent.last_heard_from {
        None => true,
        Some(last) => now_ms.saturating_sub(last) >= interval_ms,
    }
}

/// Agents due for a poll this tick: busy ones past `poll_busy_agents_interval`,
/// idle ones past `poll_idle_agents_interval`, excluding passive agents.
pub fn due_for_poll(store: &EntityStore, settings: &Settings, now_ms: u64) -> Vec<AgentId> {
    let busy_ms = settings.poll_busy_agents_interval.as_millis() as u64;
    let idle_ms = settings.poll_idle_agents_interval.as_millis() as u64;

    store
        .list_agents()
        .into_iter()
        .filter(|a| a.use_address != UseAddress::Passive)
        .filter(|a| {
            let busy = !store.tasks_for_agent(a.id).iter().all(|t| t.state.is_terminal());
            let interval_ms = if busy { busy_ms } else { idle_ms };
            is_due(a, now_ms, interval_ms)
        })
        .map(|a| a.id)
        .collect()
}

/// Poll one agent's `/tasks/` and push a reconciliation assign if it holds
/// a task the store does not have assigned to it.
pub async fn poll_agent(
    store: &EntityStore,
    client: &dyn AgentClient,
    settings: &Settings,
    now_ms: u64,
    agent_id: AgentId,
) -> Result<(), PollError> {
    let agent = store.get_agent(agent_id)?;
    let Some(address) = agent.dispatch_address() else { return Ok(()) };

    let reported = match client.list_tasks(&address, agent.port).await {
        Ok(tasks) => tasks,
        Err(ClientError::Connection(message)) => {
            tracing::warn!(%agent_id, %message, "agent poll failed");
            store.set_agent_state(agent_id, pyfarm_core::agent::AgentState::Offline)?;
            return Ok(());
        }
    };

    let assigned: HashSet<_> = store.tasks_for_agent(agent_id).iter().map(|t| t.id).collect();
    let disagrees = reported.iter().any(|t| !assigned.contains(&t.id));

    let mut agent_after = agent;
    agent_after.last_heard_from = Some(now_ms);
    store.update_agent(agent_after)?;

    if disagrees {
        tracing::info!(%agent_id, "agent reports tasks the store doesn't have assigned, reconciling");
        pyfarm_dispatch::send_tasks_to_agent(store, client, settings, now_ms, agent_id).await?;
    }

    Ok(())
}

#[cfg(test)]
#[path = "poller_tests.rs"]
mod tests;

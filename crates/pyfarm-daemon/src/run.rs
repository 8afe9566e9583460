//! Wires the periodic tasks of `spec.md` §4.7 into background tokio loops:
//! one "beat" (§5) drives the scheduler tick and the agent poller every
//! `scheduler_rate_limit`; orphan log cleanup runs on its own, coarser
//! interval.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use pyfarm_core::clock::Clock;
use pyfarm_core::settings::Settings;
use pyfarm_dispatch::AgentClient;
use pyfarm_store::EntityStore;

use crate::locks::AgentLockRegistry;
use crate::{cleanup, poller, tick};

/// Default interval between orphan-log cleanup sweeps; not one of the
/// environment-configurable knobs `spec.md` §6 enumerates, so it's a plain
/// constant rather than a `Settings` field.
const DEFAULT_CLEANUP_INTERVAL_SECS: u64 = 300;

fn cleanup_interval() -> Duration {
    std::env::var("PYFARM_ORPHAN_CLEANUP_INTERVAL_SECS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_secs)
        .unwrap_or(Duration::from_secs(DEFAULT_CLEANUP_INTERVAL_SECS))
}

/// Everything one running daemon needs, bundled so `main.rs` has a single
/// thing to construct and hand to `run::spawn_all`.
pub struct Daemon<C: Clock> {
    pub store: Arc<EntityStore>,
    pub client: Arc<dyn AgentClient>,
    pub settings: Arc<Settings>,
    pub clock: C,
}

/// Spawn the beat loop (scheduler tick + agent poller) and the orphan
/// cleanup loop. Returns their join handles for the caller to await or
/// abort on shutdown.
pub fn spawn_all<C: Clock + 'static>(daemon: Daemon<C>) -> Vec<tokio::task::JoinHandle<()>> {
    let Daemon { store, client, settings, clock } = daemon;
    let locks = Arc::new(AgentLockRegistry::new());

    let beat = {
        let store = Arc::clone(&store);
        let client = Arc::clone(&client);
        let settings = Arc::clone(&settings);
        let locks = Arc::clone(&locks);
        let clock = clock.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(settings.scheduler_rate_limit);
            loop {
                interval.tick().await;
                run_beat(&store, client.as_ref(), &settings, &locks, &clock).await;
            }
        })
    };

    let cleanup_loop = {
        let store = Arc::clone(&store);
        let logfiles_dir = settings.logfiles_dir.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(cleanup_interval());
            loop {
                interval.tick().await;
                run_cleanup(&store, &logfiles_dir);
            }
        })
    };

    vec![beat, cleanup_loop]
}

/// One beat: the scheduler tick followed by the agent poller, both span-
/// wrapped per `spec.md` §4.8 so every log line for this beat shares an id.
async fn run_beat<C: Clock>(
    store: &EntityStore,
    client: &dyn AgentClient,
    settings: &Settings,
    locks: &AgentLockRegistry,
    clock: &C,
) {
    let now_ms = clock.epoch_ms();

    let tick_span = tracing::info_span!("scheduler_tick");
    {
        let _enter = tick_span.enter();
        for agent_id in tick::candidates(store) {
            if let Err(e) = tick::assign_to_agent(store, client, settings, locks, now_ms, agent_id).await {
                tracing::error!(%agent_id, error = %e, "assign_to_agent failed");
            }
        }
    }

    let poll_span = tracing::info_span!("agent_poll");
    {
        let _enter = poll_span.enter();
        for agent_id in poller::due_for_poll(store, settings, now_ms) {
            if let Err(e) = poller::poll_agent(store, client, settings, now_ms, agent_id).await {
                tracing::error!(%agent_id, error = %e, "agent poll failed");
            }
        }
    }
}

fn run_cleanup(store: &EntityStore, logfiles_dir: &PathBuf) {
    let _span = tracing::info_span!("orphan_cleanup").entered();
    cleanup::cleanup_orphan_logs(store, logfiles_dir);
}

#[cfg(test)]
#[path = "run_tests.rs"]
mod tests;

//! `pyfarmd`: the master daemon. Resolves configuration from the
//! environment, then runs the scheduler tick, agent poller, and orphan
//! cleanup loops until asked to shut down.

use std::sync::Arc;

use pyfarm_core::clock::SystemClock;
use pyfarm_core::settings::Settings;
use pyfarm_dispatch::HttpAgentClient;
use pyfarm_store::EntityStore;

use pyfarm_daemon::{spawn_all, Daemon};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let settings = Arc::new(Settings::from_env());
    let store = Arc::new(EntityStore::new());
    let client: Arc<dyn pyfarm_dispatch::AgentClient> = Arc::new(HttpAgentClient::new(settings.agent_request_timeout));

    tracing::info!("pyfarmd starting");

    let handles = spawn_all(Daemon { store, client, settings, clock: SystemClock });

    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
    tracing::info!("pyfarmd shutting down");
    for handle in handles {
        handle.abort();
    }
}

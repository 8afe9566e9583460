use std::time::Duration;

use pyfarm_core::agent::Agent;
use pyfarm_core::job::Job;
use pyfarm_core::settings::Settings;
use pyfarm_core::task::Task;
use pyfarm_dispatch::wire::AgentTaskSummary;
use pyfarm_dispatch::FakeAgentClient;
use pyfarm_store::EntityStore;

use super::*;

#[test]
fn a_never_polled_agent_is_always_due() {
    let store = EntityStore::new();
    let agent_id = store.upsert_agent(Agent::builder().hostname("a1").build());
    let settings = Settings::default();
    assert!(due_for_poll(&store, &settings, 0).contains(&agent_id));
}

#[test]
fn a_recently_polled_idle_agent_is_not_due() {
    let store = EntityStore::new();
    let agent_id = store.upsert_agent(Agent::builder().hostname("a1").build());
    let mut agent = store.get_agent(agent_id).unwrap();
    agent.last_heard_from = Some(1_000);
    store.update_agent(agent).unwrap();

    let settings = Settings { poll_idle_agents_interval: Duration::from_secs(3600), ..Settings::default() };
    assert!(!due_for_poll(&store, &settings, 2_000).contains(&agent_id));
}

#[test]
fn a_busy_agent_uses_the_shorter_busy_interval() {
    let store = EntityStore::new();
    let agent_id = store.upsert_agent(Agent::builder().hostname("a1").build());
    let job_id = store.insert_job(Job::builder().build());
    store.insert_task(Task::builder().job_id(job_id).agent_id(agent_id).build());

    let mut agent = store.get_agent(agent_id).unwrap();
    agent.last_heard_from = Some(0);
    store.update_agent(agent).unwrap();

    let settings = Settings {
        poll_busy_agents_interval: Duration::from_secs(1),
        poll_idle_agents_interval: Duration::from_secs(3600),
        ..Settings::default()
    };
    assert!(due_for_poll(&store, &settings, 2_000).contains(&agent_id));
}

#[tokio::test]
async fn a_task_the_agent_reports_but_the_store_does_not_have_triggers_reconciliation() {
    let store = EntityStore::new();
    let agent_id = store.upsert_agent(Agent::builder().hostname("a1").build());

    let client = FakeAgentClient::new();
    client.set_agent_tasks(vec![AgentTaskSummary { id: pyfarm_core::task::TaskId::from_raw(999) }]);
    let settings = Settings::default();

    poll_agent(&store, &client, &settings, 1_000, agent_id).await.unwrap();

    assert_eq!(store.get_agent(agent_id).unwrap().last_heard_from, Some(1_000));
    let calls = client.calls();
    assert!(calls.iter().any(|c| matches!(c, pyfarm_dispatch::RecordedCall::ListTasks { .. })));
}

#[tokio::test]
async fn agreement_between_agent_and_store_does_not_reconcile() {
    let store = EntityStore::new();
    let agent_id = store.upsert_agent(Agent::builder().hostname("a1").build());
    let job_id = store.insert_job(Job::builder().build());
    let task_id = store.insert_task(Task::builder().job_id(job_id).agent_id(agent_id).build());

    let client = FakeAgentClient::new();
    client.set_agent_tasks(vec![AgentTaskSummary { id: task_id }]);
    let settings = Settings::default();

    poll_agent(&store, &client, &settings, 1_000, agent_id).await.unwrap();

    let calls = client.calls();
    assert_eq!(calls.len(), 1);
    assert!(matches!(calls[0], pyfarm_dispatch::RecordedCall::ListTasks { .. }));
}

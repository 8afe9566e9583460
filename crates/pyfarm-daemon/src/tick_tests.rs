use pyfarm_core::agent::{Agent, AgentState};
use pyfarm_core::job::{Job, JobState};
use pyfarm_core::jobqueue::JobQueue;
use pyfarm_core::jobtype::JobTypeVersion;
use pyfarm_core::settings::Settings;
use pyfarm_core::task::{Task, TaskState};
use pyfarm_dispatch::FakeAgentClient;
use pyfarm_store::EntityStore;

use super::*;

fn jobtype_version(store: &EntityStore) -> pyfarm_core::jobtype::JobTypeVersionId {
    let jt = store.upsert_jobtype("render");
    store.insert_jobtype_version(JobTypeVersion::builder().jobtype_id(jt).build()).unwrap()
}

#[tokio::test]
async fn an_idle_agent_gets_a_batch_and_is_dispatched_to() {
    let store = EntityStore::new();
    let jtv = jobtype_version(&store);
    let queue = store.insert_jobqueue(JobQueue::builder().name("q").build()).unwrap();
    let agent_id = store.upsert_agent(Agent::builder().hostname("a1").build());
    let job_id = store.insert_job(
        Job::builder().jobqueue_id(queue).jobtype_version_id(jtv).state(JobState::Queued).build(),
    );
    let task_id = store.insert_task(Task::builder().job_id(job_id).build());

    let client = FakeAgentClient::new();
    let settings = Settings::default();
    let locks = AgentLockRegistry::new();
    assign_to_agent(&store, &client, &settings, &locks, 0, agent_id).await.unwrap();

    let task = store.get_task(task_id).unwrap();
    assert_eq!(task.agent_id, Some(agent_id));
    assert_eq!(task.state, TaskState::Running);
    assert_eq!(store.get_job(job_id).unwrap().state, JobState::Running);
    assert_eq!(client.calls().len(), 1);
}

#[tokio::test]
async fn a_busy_agent_is_left_alone() {
    let store = EntityStore::new();
    let jtv = jobtype_version(&store);
    let agent_id = store.upsert_agent(Agent::builder().hostname("a1").build());
    let job_id = store.insert_job(Job::builder().jobtype_version_id(jtv).state(JobState::Running).build());
    store.insert_task(Task::builder().job_id(job_id).agent_id(agent_id).state(TaskState::Running).build());

    let client = FakeAgentClient::new();
    let settings = Settings::default();
    let locks = AgentLockRegistry::new();
    assign_to_agent(&store, &client, &settings, &locks, 0, agent_id).await.unwrap();

    assert!(client.calls().is_empty());
}

#[tokio::test]
async fn a_locked_agent_is_skipped_without_touching_the_store() {
    let store = EntityStore::new();
    let jtv = jobtype_version(&store);
    let agent_id = store.upsert_agent(Agent::builder().hostname("a1").build());
    let job_id = store.insert_job(Job::builder().jobtype_version_id(jtv).build());
    store.insert_task(Task::builder().job_id(job_id).build());

    let client = FakeAgentClient::new();
    let settings = Settings::default();
    let locks = AgentLockRegistry::new();
    let _guard = locks.try_acquire(agent_id, std::time::Instant::now()).unwrap();

    assign_to_agent(&store, &client, &settings, &locks, 0, agent_id).await.unwrap();

    assert!(client.calls().is_empty());
}

#[test]
fn candidates_excludes_offline_and_busy_agents() {
    let store = EntityStore::new();
    let idle = store.upsert_agent(Agent::builder().hostname("idle").build());
    let offline =
        store.upsert_agent(Agent::builder().hostname("offline").state(AgentState::Offline).build());
    let job_id = store.insert_job(Job::builder().state(JobState::Running).build());
    let busy = store.upsert_agent(Agent::builder().hostname("busy").build());
    store.insert_task(Task::builder().job_id(job_id).agent_id(busy).state(TaskState::Running).build());

    let result = candidates(&store);
    assert!(result.contains(&idle));
    assert!(!result.contains(&offline));
    assert!(!result.contains(&busy));
}

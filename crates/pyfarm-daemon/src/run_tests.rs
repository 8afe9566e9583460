use pyfarm_core::agent::Agent;
use pyfarm_core::clock::FakeClock;
use pyfarm_core::job::{Job, JobState};
use pyfarm_core::jobqueue::JobQueue;
use pyfarm_core::jobtype::JobTypeVersion;
use pyfarm_core::settings::Settings;
use pyfarm_core::task::Task;
use pyfarm_dispatch::FakeAgentClient;
use pyfarm_store::EntityStore;

use super::*;

#[tokio::test]
async fn one_beat_assigns_an_idle_agent_and_polls_a_busy_one() {
    let store = EntityStore::new();
    let jt = store.upsert_jobtype("render");
    let jtv = store.insert_jobtype_version(JobTypeVersion::builder().jobtype_id(jt).build()).unwrap();
    let queue = store.insert_jobqueue(JobQueue::builder().name("q").build()).unwrap();

    let idle_agent = store.upsert_agent(Agent::builder().hostname("idle").build());
    let job_id = store.insert_job(
        Job::builder().jobqueue_id(queue).jobtype_version_id(jtv).state(JobState::Queued).build(),
    );
    store.insert_task(Task::builder().job_id(job_id).build());

    let busy_agent = store.upsert_agent(Agent::builder().hostname("busy").build());
    let busy_job = store.insert_job(
        Job::builder().jobqueue_id(queue).jobtype_version_id(jtv).state(JobState::Running).build(),
    );
    store.insert_task(
        Task::builder().job_id(busy_job).agent_id(busy_agent).state(pyfarm_core::task::TaskState::Running).build(),
    );

    let client = FakeAgentClient::new();
    let settings = Settings::default();
    let locks = AgentLockRegistry::new();
    let clock = FakeClock::new();
    clock.set_epoch_ms(5_000);

    run_beat(&store, &client, &settings, &locks, &clock).await;

    assert_eq!(store.get_task(store.tasks_for_job(job_id)[0].id).unwrap().agent_id, Some(idle_agent));
    let calls = client.calls();
    assert!(calls.iter().any(|c| matches!(c, pyfarm_dispatch::RecordedCall::Assign { .. })));
    assert!(calls.iter().any(|c| matches!(c, pyfarm_dispatch::RecordedCall::ListTasks { .. })));
}

#[test]
fn cleanup_runs_without_a_logfiles_dir_on_disk() {
    let store = EntityStore::new();
    run_cleanup(&store, &PathBuf::from("/nonexistent/pyfarm/logs"));
}

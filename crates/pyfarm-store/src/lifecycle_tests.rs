use pyfarm_core::job::{Job, JobState};
use pyfarm_core::task::{Task, TaskState};

use super::*;

fn store_with_two_tasks(requeue: u32) -> (EntityStore, pyfarm_core::job::JobId, TaskId, TaskId) {
    let store = EntityStore::new();
    let job = store.insert_job(Job::builder().requeue(requeue).build());
    let a = store.insert_task(Task::builder().job_id(job).frame(10_000).build());
    let b = store.insert_task(Task::builder().job_id(job).frame(20_000).build());
    (store, job, a, b)
}

#[test]
fn assigning_an_agent_increments_attempts() {
    let (store, _job, task, _) = store_with_two_tasks(0);
    let agent = pyfarm_core::agent::AgentId::from_raw(7);
    let outcome = apply_task_change(&store, task, 1_000, |t| t.agent_id = Some(agent)).unwrap();
    assert_eq!(outcome.task.attempts, 1);
}

#[test]
fn a_failure_within_the_requeue_budget_resets_to_queued() {
    let (store, _job, task, _) = store_with_two_tasks(2);
    let agent = pyfarm_core::agent::AgentId::from_raw(7);
    apply_task_change(&store, task, 1_000, |t| t.agent_id = Some(agent)).unwrap();
    let outcome = apply_task_change(&store, task, 2_000, |t| t.state = TaskState::Failed).unwrap();
    assert_eq!(outcome.task.state, TaskState::Queued);
    assert_eq!(outcome.task.agent_id, None);
    assert_eq!(outcome.task.failures, 1);
    assert!(outcome.notify.is_none());
}

#[test]
fn a_failure_beyond_the_requeue_budget_is_permanent_and_rolls_up_once_all_tasks_finish() {
    let (store, job, a, b) = store_with_two_tasks(0);
    let agent = pyfarm_core::agent::AgentId::from_raw(7);
    apply_task_change(&store, a, 1_000, |t| t.agent_id = Some(agent)).unwrap();
    let outcome = apply_task_change(&store, a, 2_000, |t| t.state = TaskState::Failed).unwrap();
    assert_eq!(outcome.task.state, TaskState::Failed);
    // sibling b is still queued, so the job hasn't rolled up yet
    assert!(outcome.notify.is_none());
    assert_eq!(store.get_job(job).unwrap().state, JobState::Queued);

    let outcome = apply_task_change(&store, b, 3_000, |t| t.state = TaskState::Done).unwrap();
    assert_eq!(outcome.job.state, JobState::Failed);
    let notice = outcome.notify.expect("job should roll up once both tasks are terminal");
    assert_eq!(notice.job_id, job);
    assert_eq!(notice.final_state, JobState::Failed);
}

#[test]
fn a_job_rolls_up_to_done_when_every_task_finishes_successfully() {
    let (store, job, a, b) = store_with_two_tasks(0);
    apply_task_change(&store, a, 1_000, |t| t.state = TaskState::Done).unwrap();
    let outcome = apply_task_change(&store, b, 2_000, |t| t.state = TaskState::Done).unwrap();
    assert_eq!(outcome.job.state, JobState::Done);
    assert_eq!(outcome.notify.unwrap().final_state, JobState::Done);
    assert_eq!(store.get_job(job).unwrap().state, JobState::Done);
}

#[test]
fn completing_a_task_clears_its_last_error() {
    let (store, _job, task, _) = store_with_two_tasks(0);
    apply_task_change(&store, task, 1_000, |t| t.last_error = Some("boom".into())).unwrap();
    let outcome = apply_task_change(&store, task, 2_000, |t| t.state = TaskState::Done).unwrap();
    assert_eq!(outcome.task.last_error, None);
}

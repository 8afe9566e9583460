//! Task CRUD. Mutations that touch `state` or `agent_id` must go through
//! [`crate::lifecycle::apply_task_change`] instead of [`EntityStore::update_task_raw`]
//! so the lifecycle hook sequence runs atomically with the change.

use pyfarm_core::job::JobId;
use pyfarm_core::task::{Task, TaskId};

use crate::error::StoreError;

use super::EntityStore;

impl EntityStore {
    pub fn insert_task(&self, mut task: Task) -> TaskId {
        let mut inner = self.inner.write();
        inner.next_task_id += 1;
        let id = TaskId::from_raw(inner.next_task_id);
        task.id = id;
        inner.tasks.insert(id, task);
        id
    }

    pub fn get_task(&self, id: TaskId) -> Result<Task, StoreError> {
        self.inner.read().tasks.get(&id).cloned().ok_or_else(|| StoreError::not_found("Task", id))
    }

    pub fn tasks_for_job(&self, job_id: JobId) -> Vec<Task> {
        let mut tasks: Vec<Task> = self.inner.read().tasks.values().filter(|t| t.job_id == job_id).cloned().collect();
        tasks.sort_by_key(|t| t.frame);
        tasks
    }

    pub fn tasks_for_agent(&self, agent_id: pyfarm_core::agent::AgentId) -> Vec<Task> {
        self.inner.read().tasks.values().filter(|t| t.agent_id == Some(agent_id)).cloned().collect()
    }

    /// Write a task record without running lifecycle hooks. Only for
    /// mutations that touch neither `state` nor `agent_id` (e.g. seeding
    /// fixtures, or the dispatcher rolling back `attempts` on a 503).
    pub fn update_task_raw(&self, task: Task) -> Result<(), StoreError> {
        let mut inner = self.inner.write();
        if !inner.tasks.contains_key(&task.id) {
            return Err(StoreError::not_found("Task", task.id));
        }
        inner.tasks.insert(task.id, task);
        Ok(())
    }

    /// Remove a task locally. If its job is `to_be_deleted` and no tasks
    /// remain, the job is removed too.
    pub fn delete_task(&self, id: TaskId) -> Result<bool, StoreError> {
        let job_id = {
            let mut inner = self.inner.write();
            let task = inner.tasks.remove(&id).ok_or_else(|| StoreError::not_found("Task", id))?;
            task.job_id
        };
        Ok(self.delete_job_if_empty_and_pending(job_id))
    }
}

#[cfg(test)]
mod tests {
    use pyfarm_core::job::Job;

    use super::*;

    #[test]
    fn tasks_for_job_are_sorted_by_frame() {
        let store = EntityStore::new();
        let job = store.insert_job(Job::builder().build());
        store.insert_task(Task::builder().job_id(job).frame(30_000).build());
        store.insert_task(Task::builder().job_id(job).frame(10_000).build());
        store.insert_task(Task::builder().job_id(job).frame(20_000).build());
        let frames: Vec<i64> = store.tasks_for_job(job).iter().map(|t| t.frame).collect();
        assert_eq!(frames, vec![10_000, 20_000, 30_000]);
    }

    #[test]
    fn deleting_the_last_task_of_a_to_be_deleted_job_removes_the_job() {
        let store = EntityStore::new();
        let job = store.insert_job(Job::builder().build());
        let task = store.insert_task(Task::builder().job_id(job).build());
        store.request_job_deletion(job).unwrap();
        assert!(store.delete_task(task).unwrap());
        assert!(store.get_job(job).is_err());
    }
}

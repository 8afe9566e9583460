//! Job CRUD.

use pyfarm_core::job::{Job, JobId};

use crate::error::StoreError;

use super::EntityStore;

impl EntityStore {
    pub fn insert_job(&self, mut job: Job) -> JobId {
        let mut inner = self.inner.write();
        inner.next_job_id += 1;
        let id = JobId::from_raw(inner.next_job_id);
        job.id = id;
        inner.jobs.insert(id, job);
        id
    }

    pub fn get_job(&self, id: JobId) -> Result<Job, StoreError> {
        self.inner.read().jobs.get(&id).cloned().ok_or_else(|| StoreError::not_found("Job", id))
    }

    pub fn update_job(&self, job: Job) -> Result<(), StoreError> {
        let mut inner = self.inner.write();
        if !inner.jobs.contains_key(&job.id) {
            return Err(StoreError::not_found("Job", job.id));
        }
        inner.jobs.insert(job.id, job);
        Ok(())
    }

    pub fn jobs_in_queue(&self, jobqueue_id: pyfarm_core::jobqueue::JobQueueId) -> Vec<Job> {
        self.inner.read().jobs.values().filter(|j| j.jobqueue_id == jobqueue_id).cloned().collect()
    }

    /// Whether every parent of `job` is `Done`.
    pub fn parents_done(&self, job: &Job) -> bool {
        let inner = self.inner.read();
        job.parents
            .iter()
            .all(|id| inner.jobs.get(id).map(|p| p.state == pyfarm_core::job::JobState::Done).unwrap_or(false))
    }

    /// Mark a job `to_be_deleted`; if it already has no tasks, remove it
    /// immediately (I6).
    pub fn request_job_deletion(&self, id: JobId) -> Result<bool, StoreError> {
        let mut inner = self.inner.write();
        let job = inner.jobs.get_mut(&id).ok_or_else(|| StoreError::not_found("Job", id))?;
        job.to_be_deleted = true;
        let remaining = inner.tasks.values().filter(|t| t.job_id == id).count();
        if remaining == 0 {
            inner.jobs.remove(&id);
            return Ok(true);
        }
        Ok(false)
    }

    /// If `job_id` is `to_be_deleted` and has no remaining tasks, remove it.
    /// Called after task deletion and from the deferred re-check.
    pub fn delete_job_if_empty_and_pending(&self, id: JobId) -> bool {
        let mut inner = self.inner.write();
        let Some(job) = inner.jobs.get(&id) else { return false };
        if !job.to_be_deleted {
            return false;
        }
        let remaining = inner.tasks.values().filter(|t| t.job_id == id).count();
        if remaining == 0 {
            inner.jobs.remove(&id);
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use pyfarm_core::job::JobState;
    use pyfarm_core::task::Task;

    use super::*;

    #[test]
    fn request_deletion_removes_job_immediately_when_it_has_no_tasks() {
        let store = EntityStore::new();
        let job = store.insert_job(Job::builder().build());
        assert!(store.request_job_deletion(job).unwrap());
        assert!(store.get_job(job).is_err());
    }

    #[test]
    fn request_deletion_only_marks_pending_when_tasks_remain() {
        let store = EntityStore::new();
        let job = store.insert_job(Job::builder().build());
        store.insert_task(Task::builder().job_id(job).build());
        assert!(!store.request_job_deletion(job).unwrap());
        assert!(store.get_job(job).unwrap().to_be_deleted);
    }

    #[test]
    fn parents_done_is_true_when_there_are_no_parents() {
        let store = EntityStore::new();
        let job = Job::builder().build();
        assert!(store.parents_done(&job));
    }

    #[test]
    fn parents_done_is_false_when_a_parent_is_not_done() {
        let store = EntityStore::new();
        let parent = store.insert_job(Job::builder().state(JobState::Running).build());
        let child = Job::builder().build();
        let mut child = child;
        child.parents.push(parent);
        assert!(!store.parents_done(&child));
    }
}

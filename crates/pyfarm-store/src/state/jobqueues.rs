//! Job-queue CRUD. `(parent_id, name)` is unique; root names are globally
//! unique (folded into the same index since root queues share `parent_id =
//! None`).

use pyfarm_core::jobqueue::{JobQueue, JobQueueId};

use crate::error::StoreError;

use super::EntityStore;

impl EntityStore {
    pub fn insert_jobqueue(&self, mut queue: JobQueue) -> Result<JobQueueId, StoreError> {
        let mut inner = self.inner.write();
        let key = (queue.parent_id, queue.name.clone());
        if inner.jobqueues_by_parent_name.contains_key(&key) {
            return Err(StoreError::conflict(format!("duplicate queue name {:?}", queue.name)));
        }
        if let Some(parent_id) = queue.parent_id {
            if !inner.jobqueues.contains_key(&parent_id) {
                return Err(StoreError::not_found("JobQueue", parent_id));
            }
        }
        inner.next_jobqueue_id += 1;
        let id = JobQueueId::from_raw(inner.next_jobqueue_id);
        queue.id = id;
        inner.jobqueues_by_parent_name.insert(key, id);
        inner.jobqueues.insert(id, queue);
        Ok(id)
    }

    pub fn get_jobqueue(&self, id: JobQueueId) -> Result<JobQueue, StoreError> {
        self.inner.read().jobqueues.get(&id).cloned().ok_or_else(|| StoreError::not_found("JobQueue", id))
    }

    pub fn child_jobqueues(&self, parent_id: Option<JobQueueId>) -> Vec<JobQueue> {
        self.inner.read().jobqueues.values().filter(|q| q.parent_id == parent_id).cloned().collect()
    }

    /// Rejects deletion if the queue has child queues or jobs (I6).
    pub fn delete_jobqueue(&self, id: JobQueueId) -> Result<(), StoreError> {
        let mut inner = self.inner.write();
        if !inner.jobqueues.contains_key(&id) {
            return Err(StoreError::not_found("JobQueue", id));
        }
        if inner.jobqueues.values().any(|q| q.parent_id == Some(id)) {
            return Err(StoreError::conflict("queue has child queues"));
        }
        if inner.jobs.values().any(|j| j.jobqueue_id == id) {
            return Err(StoreError::conflict("queue has child jobs"));
        }
        inner.jobqueues_by_parent_name.retain(|_, v| *v != id);
        inner.jobqueues.remove(&id);
        Ok(())
    }

    /// Recompute and persist `fullpath` for a queue from its ancestor chain.
    pub fn rebuild_fullpath(&self, id: JobQueueId) -> Result<String, StoreError> {
        let mut inner = self.inner.write();
        let mut segments = Vec::new();
        let mut current = Some(id);
        while let Some(cur) = current {
            let queue = inner.jobqueues.get(&cur).ok_or_else(|| StoreError::not_found("JobQueue", cur))?;
            segments.push(queue.name.clone());
            current = queue.parent_id;
        }
        segments.reverse();
        let fullpath = format!("/{}", segments.join("/"));
        if let Some(queue) = inner.jobqueues.get_mut(&id) {
            queue.fullpath = Some(fullpath.clone());
        }
        Ok(fullpath)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_sibling_name_is_rejected() {
        let store = EntityStore::new();
        store.insert_jobqueue(JobQueue::builder().name("a").build()).unwrap();
        let err = store.insert_jobqueue(JobQueue::builder().name("a").build());
        assert!(err.is_err());
    }

    #[test]
    fn same_name_under_different_parents_is_allowed() {
        let store = EntityStore::new();
        let root = store.insert_jobqueue(JobQueue::builder().name("root").build()).unwrap();
        store.insert_jobqueue(JobQueue::builder().name("child").parent_id(Some(root)).build()).unwrap();
        let other_root = store.insert_jobqueue(JobQueue::builder().name("other").build()).unwrap();
        assert!(store
            .insert_jobqueue(JobQueue::builder().name("child").parent_id(Some(other_root)).build())
            .is_ok());
    }

    #[test]
    fn deleting_a_queue_with_children_is_rejected() {
        let store = EntityStore::new();
        let root = store.insert_jobqueue(JobQueue::builder().name("root").build()).unwrap();
        store.insert_jobqueue(JobQueue::builder().name("child").parent_id(Some(root)).build()).unwrap();
        assert!(store.delete_jobqueue(root).is_err());
    }

    #[test]
    fn fullpath_is_the_recursive_slash_joined_name_chain() {
        let store = EntityStore::new();
        let root = store.insert_jobqueue(JobQueue::builder().name("root").build()).unwrap();
        let child = store.insert_jobqueue(JobQueue::builder().name("child").parent_id(Some(root)).build()).unwrap();
        assert_eq!(store.rebuild_fullpath(child).unwrap(), "/root/child");
    }
}

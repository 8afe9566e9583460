//! Task log registry and its associations to tasks/attempts.

use pyfarm_core::task::TaskId;
use pyfarm_core::tasklog::{TaskLogAssociation, TaskLogIdentifier};

use super::EntityStore;

impl EntityStore {
    pub fn register_tasklog(&self, identifier: TaskLogIdentifier) {
        self.inner.write().tasklog_registry.insert(identifier);
    }

    pub fn associate_tasklog(&self, task_id: TaskId, attempt: u32, identifier: TaskLogIdentifier) {
        let mut inner = self.inner.write();
        inner.tasklog_registry.insert(identifier.clone());
        inner.tasklogs.push(TaskLogAssociation { task_id, attempt, identifier });
    }

    /// Registered logs with no referencing association (candidates for
    /// removal during orphan cleanup).
    pub fn orphaned_tasklogs(&self) -> Vec<TaskLogIdentifier> {
        let inner = self.inner.read();
        inner
            .tasklog_registry
            .iter()
            .filter(|id| !inner.tasklogs.iter().any(|assoc| &&assoc.identifier == id))
            .cloned()
            .collect()
    }

    pub fn remove_tasklog(&self, identifier: &TaskLogIdentifier) {
        let mut inner = self.inner.write();
        inner.tasklog_registry.remove(identifier);
        inner.tasklogs.retain(|assoc| &assoc.identifier != identifier);
    }

    /// Whether a log identifier (e.g. a file name found on disk) has a
    /// registered row, for the orphan-file sweep over `LOGFILES_DIR`.
    pub fn tasklog_is_registered(&self, identifier: &str) -> bool {
        self.inner.read().tasklog_registry.iter().any(|id| id.as_str() == identifier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a_log_with_no_association_is_orphaned() {
        let store = EntityStore::new();
        let id = TaskLogIdentifier::new("log-1");
        store.register_tasklog(id.clone());
        assert_eq!(store.orphaned_tasklogs(), vec![id]);
    }

    #[test]
    fn an_associated_log_is_not_orphaned() {
        let store = EntityStore::new();
        let id = TaskLogIdentifier::new("log-1");
        store.associate_tasklog(TaskId::from_raw(1), 1, id);
        assert!(store.orphaned_tasklogs().is_empty());
    }
}

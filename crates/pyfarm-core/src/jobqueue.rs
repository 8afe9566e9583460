//! Job queue: an interior node of the hierarchical weighted-fair scheduling
//! tree. Leaves in the scheduling sense are jobs, not queues.

use serde::{Deserialize, Serialize};

crate::define_id!(JobQueueId);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobQueue {
    pub id: JobQueueId,
    pub parent_id: Option<JobQueueId>,
    /// Unique among siblings; unique globally among root queues.
    pub name: String,
    pub priority: i32,
    pub weight: u32,
    pub minimum_agents: Option<u32>,
    pub maximum_agents: Option<u32>,
    /// Denormalized `/root/.../name` path. `None` until first computed;
    /// rebuilt on demand rather than kept eagerly consistent.
    pub fullpath: Option<String>,
}

impl JobQueue {
    /// Weight used in fairness-score denominators. A weight of zero is
    /// treated as 1 (B1).
    pub fn effective_weight(&self) -> f64 {
        if self.weight == 0 {
            1.0
        } else {
            self.weight as f64
        }
    }

    pub fn is_unbounded(&self) -> bool {
        self.maximum_agents.is_none()
    }
}

#[cfg(any(test, feature = "test-support"))]
crate::builder! {
    pub struct JobQueueBuilder => JobQueue {
        set {
            id: JobQueueId = JobQueueId::from_raw(1),
            parent_id: Option<JobQueueId> = None,
            priority: i32 = 0,
            weight: u32 = 1,
            minimum_agents: Option<u32> = None,
            maximum_agents: Option<u32> = None,
        }
        into {
            name: String = "root",
        }
        option {
            fullpath: String = None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_weight_is_treated_as_one() {
        let queue = JobQueue::builder().weight(0).build();
        assert_eq!(queue.effective_weight(), 1.0);
    }

    #[test]
    fn nonzero_weight_is_used_as_is() {
        let queue = JobQueue::builder().weight(3).build();
        assert_eq!(queue.effective_weight(), 3.0);
    }

    #[test]
    fn no_maximum_is_unbounded() {
        let queue = JobQueue::builder().build();
        assert!(queue.is_unbounded());
        let bounded = JobQueue::builder().maximum_agents(Some(2)).build();
        assert!(!bounded.is_unbounded());
    }
}

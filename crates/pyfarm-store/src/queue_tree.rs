//! In-memory queue tree walker: [`EntityStore::read_subtree`] materializes a
//! [`Node`] tree rooted at one queue (or a synthetic virtual root holding
//! every top-level queue), with agent-assignment counts aggregated in a
//! single pass rather than one query per node.

use std::collections::{HashMap, HashSet};

use pyfarm_core::agent::{AgentId, AgentState};
use pyfarm_core::job::{Job, JobId};
use pyfarm_core::jobqueue::{JobQueue, JobQueueId};

use crate::state::{EntityStore, Inner};

/// The entity a [`Node`] wraps: either a job queue (an interior node) or a
/// job (always a leaf of the tree, though not of the scheduling walk —
/// matching proceeds into a job's tasks separately).
#[derive(Debug, Clone)]
pub enum NodeSource {
    Queue(JobQueue),
    Job(Job),
}

#[derive(Debug, Clone)]
pub struct Node {
    pub source: NodeSource,
    /// Child queues and child jobs, in one list, sorted by priority
    /// descending (ties broken by queue/job id for determinism).
    pub branches: Vec<Node>,
    /// Distinct non-offline/disabled agents currently holding a task in a
    /// non-terminal state under this node.
    pub total_assigned_agents: u32,
    /// Cleared for the rest of the tick once a placement attempt under this
    /// node yields nothing.
    pub can_use_more_agents: bool,
    /// Snapshot of `total_assigned_agents` as of the start of the tick.
    pub preassigned_agents: u32,
}

impl Node {
    pub fn minimum_agents(&self) -> Option<u32> {
        match &self.source {
            NodeSource::Queue(q) => q.minimum_agents,
            NodeSource::Job(j) => j.minimum_agents,
        }
    }

    pub fn maximum_agents(&self) -> Option<u32> {
        match &self.source {
            NodeSource::Queue(q) => q.maximum_agents,
            NodeSource::Job(j) => j.maximum_agents,
        }
    }

    pub fn priority(&self) -> i32 {
        match &self.source {
            NodeSource::Queue(q) => q.priority,
            NodeSource::Job(j) => j.priority,
        }
    }

    pub fn effective_weight(&self) -> f64 {
        match &self.source {
            NodeSource::Queue(q) => q.effective_weight(),
            NodeSource::Job(j) => j.effective_weight(),
        }
    }

    pub fn job(&self) -> Option<&Job> {
        match &self.source {
            NodeSource::Job(j) => Some(j),
            NodeSource::Queue(_) => None,
        }
    }

    pub fn queue(&self) -> Option<&JobQueue> {
        match &self.source {
            NodeSource::Queue(q) => Some(q),
            NodeSource::Job(_) => None,
        }
    }

    /// Whether this node can currently accept one more agent.
    pub fn has_room(&self) -> bool {
        self.can_use_more_agents && self.maximum_agents().is_none_or_more_than(self.total_assigned_agents)
    }

    /// Record a placement made this tick so subsequent fairness-score
    /// comparisons within the same tick see it immediately.
    pub fn record_placement(&mut self) {
        self.total_assigned_agents += 1;
    }
}

trait MaxAgentsExt {
    fn is_none_or_more_than(&self, assigned: u32) -> bool;
}

impl MaxAgentsExt for Option<u32> {
    fn is_none_or_more_than(&self, assigned: u32) -> bool {
        match self {
            None => true,
            Some(max) => assigned < *max,
        }
    }
}

impl EntityStore {
    /// Build the in-memory tree rooted at `queue_id`, or a synthetic virtual
    /// root over every top-level queue when `None`.
    #[allow(clippy::expect_used)]
    pub fn read_subtree(&self, queue_id: Option<JobQueueId>) -> Node {
        let inner = self.inner.read();
        let job_agents = distinct_assigned_agents_by_job(&inner);

        match queue_id {
            Some(id) => {
                let queue = inner.jobqueues.get(&id).cloned().expect("queue_id must exist");
                build_queue_node(&queue, &inner, &job_agents).0
            }
            None => {
                let mut branches = Vec::new();
                let mut agents = HashSet::new();
                for root in inner.jobqueues.values().filter(|q| q.parent_id.is_none()) {
                    let (node, node_agents) = build_queue_node(root, &inner, &job_agents);
                    agents.extend(node_agents);
                    branches.push(node);
                }
                branches.sort_by(|a, b| b.priority().cmp(&a.priority()));
                let count = agents.len() as u32;
                Node {
                    source: NodeSource::Queue(virtual_root()),
                    branches,
                    total_assigned_agents: count,
                    can_use_more_agents: true,
                    preassigned_agents: count,
                }
            }
        }
    }
}

/// A queue-shaped placeholder used only as the synthetic virtual root; it is
/// never persisted and its id does not resolve through the store.
fn virtual_root() -> JobQueue {
    JobQueue {
        id: JobQueueId::from_raw(0),
        parent_id: None,
        name: String::new(),
        priority: 0,
        weight: 1,
        minimum_agents: None,
        maximum_agents: None,
        fullpath: Some("/".to_string()),
    }
}

fn distinct_assigned_agents_by_job(inner: &Inner) -> HashMap<JobId, HashSet<AgentId>> {
    let mut map: HashMap<JobId, HashSet<AgentId>> = HashMap::new();
    for task in inner.tasks.values() {
        if task.state.is_terminal() {
            continue;
        }
        let Some(agent_id) = task.agent_id else { continue };
        let Some(agent) = inner.agents.get(&agent_id) else { continue };
        if matches!(agent.state, AgentState::Offline | AgentState::Disabled) {
            continue;
        }
        map.entry(task.job_id).or_default().insert(agent_id);
    }
    map
}

fn build_queue_node(
    queue: &JobQueue,
    inner: &Inner,
    job_agents: &HashMap<JobId, HashSet<AgentId>>,
) -> (Node, HashSet<AgentId>) {
    let mut branches = Vec::new();
    let mut agents: HashSet<AgentId> = HashSet::new();

    for child in inner.jobqueues.values().filter(|q| q.parent_id == Some(queue.id)) {
        let (node, node_agents) = build_queue_node(child, inner, job_agents);
        agents.extend(node_agents);
        branches.push(node);
    }
    for job in inner.jobs.values().filter(|j| j.jobqueue_id == queue.id) {
        let node = build_job_node(job, job_agents);
        if let Some(set) = job_agents.get(&job.id) {
            agents.extend(set.iter().copied());
        }
        branches.push(node);
    }
    branches.sort_by(|a, b| b.priority().cmp(&a.priority()));

    let count = agents.len() as u32;
    let node = Node {
        source: NodeSource::Queue(queue.clone()),
        branches,
        total_assigned_agents: count,
        can_use_more_agents: true,
        preassigned_agents: count,
    };
    (node, agents)
}

fn build_job_node(job: &Job, job_agents: &HashMap<JobId, HashSet<AgentId>>) -> Node {
    let count = job_agents.get(&job.id).map(HashSet::len).unwrap_or(0) as u32;
    Node {
        source: NodeSource::Job(job.clone()),
        branches: Vec::new(),
        total_assigned_agents: count,
        can_use_more_agents: true,
        preassigned_agents: count,
    }
}

#[cfg(test)]
#[path = "queue_tree_tests.rs"]
mod tests;

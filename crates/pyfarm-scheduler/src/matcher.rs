//! Job matching: choosing which job an idle agent should run next, and
//! which of that job's tasks form the batch to dispatch.
//!
//! The matcher only chooses; it never assigns. Every call consults one
//! [`Node`] snapshot from [`pyfarm_store::EntityStore::read_subtree`] so a
//! walk never sees agent counts change mid-recursion.

use std::cmp::Ordering;
use std::collections::HashSet;

use pyfarm_core::agent::{Agent, AgentState};
use pyfarm_core::job::{Job, JobId, JobState};
use pyfarm_core::software::SoftwareVersion;
use pyfarm_core::task::Task;
use pyfarm_store::{EntityStore, Node, NodeSource, StoreError};

#[derive(Debug, Clone, Copy)]
pub struct MatchSettings {
    pub use_total_ram_for_scheduling: bool,
    pub prefer_running_jobs: bool,
}

/// Choose a job this agent can immediately execute by walking the tree
/// rooted at `node`, or `None` if nothing matches.
pub fn get_job_for_agent(
    store: &EntityStore,
    node: &Node,
    agent: &Agent,
    agent_software: &[SoftwareVersion],
    settings: &MatchSettings,
    unwanted_job_ids: &HashSet<JobId>,
) -> Result<Option<Job>, StoreError> {
    let available_ram = agent.available_ram(settings.use_total_ram_for_scheduling);

    let mut child_jobs = Vec::new();
    let mut child_queues = Vec::new();
    for branch in &node.branches {
        match &branch.source {
            NodeSource::Job(job) => {
                if is_eligible(store, job, agent, agent_software, available_ram, unwanted_job_ids)? {
                    child_jobs.push(branch);
                }
            }
            NodeSource::Queue(_) => child_queues.push(branch),
        }
    }

    if let Some(job) = minimum_enforcement_pass(store, &child_jobs, &child_queues, agent, agent_software, settings, unwanted_job_ids)? {
        return Ok(Some(job));
    }

    priority_pass(store, &child_jobs, &child_queues, agent, agent_software, settings, unwanted_job_ids)
}

#[allow(clippy::expect_used)]
fn minimum_enforcement_pass(
    store: &EntityStore,
    child_jobs: &[&Node],
    child_queues: &[&Node],
    agent: &Agent,
    agent_software: &[SoftwareVersion],
    settings: &MatchSettings,
    unwanted_job_ids: &HashSet<JobId>,
) -> Result<Option<Job>, StoreError> {
    for branch in child_jobs {
        let job = branch.job().expect("child_jobs holds only job branches");
        match job.state {
            JobState::Running => {
                let min = job.minimum_agents.unwrap_or(0);
                if branch.total_assigned_agents < min
                    && under_max(job.maximum_agents, branch.total_assigned_agents)
                    && branch.can_use_more_agents
                {
                    return Ok(Some(job.clone()));
                }
            }
            JobState::Queued => {
                if job.minimum_agents.unwrap_or(0) > 0 {
                    return Ok(Some(job.clone()));
                }
            }
            _ => {}
        }
    }

    for branch in child_queues {
        let min = branch.minimum_agents().unwrap_or(0);
        if branch.total_assigned_agents < min && under_max(branch.maximum_agents(), branch.total_assigned_agents) {
            if let Some(job) = get_job_for_agent(store, branch, agent, agent_software, settings, unwanted_job_ids)? {
                return Ok(Some(job));
            }
        }
    }

    Ok(None)
}

fn priority_pass(
    store: &EntityStore,
    child_jobs: &[&Node],
    child_queues: &[&Node],
    agent: &Agent,
    agent_software: &[SoftwareVersion],
    settings: &MatchSettings,
    unwanted_job_ids: &HashSet<JobId>,
) -> Result<Option<Job>, StoreError> {
    let mut priorities: Vec<i32> = child_jobs.iter().map(|b| b.priority()).chain(child_queues.iter().map(|b| b.priority())).collect();
    priorities.sort_unstable();
    priorities.dedup();

    for priority in priorities.into_iter().rev() {
        let bucket: Vec<&&Node> =
            child_jobs.iter().chain(child_queues.iter()).filter(|b| b.priority() == priority).collect();

        let weight_sum: f64 = bucket.iter().filter(|b| contributes_weight(b)).map(|b| b.effective_weight()).sum();
        let total_assigned: u32 = bucket.iter().map(|b| b.total_assigned_agents).sum();

        let mut sorted = bucket.clone();
        sorted.sort_by(|a, b| {
            fairness_score(a, total_assigned, weight_sum)
                .partial_cmp(&fairness_score(b, total_assigned, weight_sum))
                .unwrap_or(Ordering::Equal)
        });

        let mut candidate: Option<Job> = None;
        for branch in sorted {
            match &branch.source {
                NodeSource::Job(job) if job.state == JobState::Running => {
                    if branch.can_use_more_agents && under_max(branch.maximum_agents(), branch.total_assigned_agents) {
                        if settings.prefer_running_jobs {
                            return Ok(Some(job.clone()));
                        }
                        candidate = pick_older(candidate, job.clone());
                    }
                }
                NodeSource::Job(job) => {
                    // queued: candidate only, never a direct return
                    candidate = pick_older(candidate, job.clone());
                }
                NodeSource::Queue(_) => {
                    if under_max(branch.maximum_agents(), branch.total_assigned_agents) {
                        if let Some(job) = get_job_for_agent(store, branch, agent, agent_software, settings, unwanted_job_ids)? {
                            return Ok(Some(job));
                        }
                    }
                }
            }
        }
        if let Some(job) = candidate {
            return Ok(Some(job));
        }
    }

    Ok(None)
}

fn contributes_weight(branch: &Node) -> bool {
    matches!(&branch.source, NodeSource::Queue(_)) || matches!(branch.job().map(|j| j.state), Some(JobState::Running))
}

fn fairness_score(branch: &Node, total_assigned: u32, weight_sum: f64) -> f64 {
    let assigned_ratio = if total_assigned == 0 { 0.0 } else { branch.total_assigned_agents as f64 / total_assigned as f64 };
    let weight_ratio = if weight_sum == 0.0 { 1.0 } else { branch.effective_weight() / weight_sum };
    assigned_ratio / weight_ratio
}

fn pick_older(candidate: Option<Job>, job: Job) -> Option<Job> {
    match candidate {
        None => Some(job),
        Some(current) if job.time_submitted < current.time_submitted => Some(job),
        Some(current) => Some(current),
    }
}

fn under_max(maximum: Option<u32>, assigned: u32) -> bool {
    maximum.map_or(true, |max| assigned < max)
}

fn is_eligible(
    store: &EntityStore,
    job: &Job,
    agent: &Agent,
    agent_software: &[SoftwareVersion],
    available_ram: u32,
    unwanted_job_ids: &HashSet<JobId>,
) -> Result<bool, StoreError> {
    if !matches!(job.state, JobState::Running | JobState::Queued) {
        return Ok(false);
    }
    if unwanted_job_ids.contains(&job.id) {
        return Ok(false);
    }
    if !store.parents_done(job) {
        return Ok(false);
    }
    if !agent.supports_jobtype_version(job.jobtype_version_id) {
        return Ok(false);
    }
    if job.ram > available_ram {
        return Ok(false);
    }
    let jtv = store.get_jobtype_version(job.jobtype_version_id)?;
    let satisfied = job
        .software_requirements
        .iter()
        .chain(jtv.software_requirements.iter())
        .all(|req| req.is_satisfied_by(agent_software));
    Ok(satisfied)
}

/// Tasks of `job`, in ascending frame order, eligible for a single
/// `/assign` batch: non-terminal (or freshly created), unassigned or held
/// by an agent no longer able to keep it, and matching the job's priority.
/// `batch_contiguous` jobs additionally require each frame to equal the
/// previous plus `job.by`; the batch stops at the first gap either way.
pub fn select_batch_tasks(store: &EntityStore, job: &Job) -> Result<Vec<Task>, StoreError> {
    let jtv = store.get_jobtype_version(job.jobtype_version_id)?;
    let limit = match jtv.max_batch {
        Some(max) => job.batch.min(max),
        None => job.batch,
    };

    let mut candidates: Vec<Task> = store
        .tasks_for_job(job.id)
        .into_iter()
        .filter(|t| t.priority == job.priority)
        .filter(|t| is_batchable(store, t))
        .collect();
    candidates.truncate_after_gap_if_contiguous(jtv.batch_contiguous, job.by);

    candidates.truncate(limit as usize);
    Ok(candidates)
}

fn is_batchable(store: &EntityStore, task: &Task) -> bool {
    let assigned_agent_unavailable = match task.agent_id {
        None => false,
        Some(agent_id) => store
            .get_agent(agent_id)
            .map(|a| matches!(a.state, AgentState::Offline | AgentState::Disabled))
            .unwrap_or(true),
    };
    task.is_batchable(assigned_agent_unavailable)
}

trait TruncateAfterGap {
    fn truncate_after_gap_if_contiguous(&mut self, contiguous: bool, by: i64);
}

impl TruncateAfterGap for Vec<Task> {
    fn truncate_after_gap_if_contiguous(&mut self, contiguous: bool, by: i64) {
        if !contiguous {
            return;
        }
        let mut prev_frame = None;
        let mut cut = self.len();
        for (i, task) in self.iter().enumerate() {
            if let Some(prev) = prev_frame {
                if task.frame != prev + by {
                    cut = i;
                    break;
                }
            }
            prev_frame = Some(task.frame);
        }
        self.truncate(cut);
    }
}

#[cfg(test)]
#[path = "matcher_tests.rs"]
mod tests;

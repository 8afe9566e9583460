//! Weighted-fair allocator: distributing a pool of otherwise-interchangeable
//! idle agents across one [`Node`] subtree's branches, honoring minima
//! before falling back to priority/weight fairness.
//!
//! Each available agent is placed by [`place_one`], called once per agent.
//! Its minima check round-robins across sibling branches that still need
//! more than their minimum: among branches currently under minimum it picks
//! the one with the fewest agents assigned so far (ties keep branch order),
//! so a constrained budget spread across several under-minimum branches
//! is divided one agent at a time rather than draining the first branch to
//! completion before any other gets a look in. Only once no branch needs
//! more minima does a call fall through to the priority/weight-fairness
//! pass.
//!
//! This module has no caller in the live scheduler tick; see `tick.rs` and
//! `DESIGN.md` for why.

use std::cmp::Ordering;
use std::collections::VecDeque;

use pyfarm_core::agent::AgentId;
use pyfarm_core::job::JobId;
use pyfarm_store::{Node, NodeSource};

/// One agent handed to one job. The scheduler tick turns this into an
/// actual task batch via [`crate::matcher::select_batch_tasks`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub agent_id: AgentId,
    pub job_id: JobId,
}

/// Distribute `agents` across `node`'s branches. Mutates `node` in place so
/// `total_assigned_agents` reflects every placement immediately, and clears
/// `can_use_more_agents` for the rest of the tick if nothing could be
/// placed at all.
pub fn assign_agents_to_queue(node: &mut Node, mut agents: VecDeque<AgentId>) -> Vec<Placement> {
    let mut placements = Vec::new();
    while let Some(agent_id) = agents.pop_front() {
        match place_one(node) {
            Some(job_id) => placements.push(Placement { agent_id, job_id }),
            None => break,
        }
    }
    if placements.is_empty() {
        node.can_use_more_agents = false;
    }
    placements
}

fn place_one(node: &mut Node) -> Option<JobId> {
    if let NodeSource::Job(job) = &node.source {
        let job_id = job.id;
        node.record_placement();
        return Some(job_id);
    }

    let mut under_minimum: Vec<usize> = node
        .branches
        .iter()
        .enumerate()
        .filter(|(_, b)| {
            let min = b.minimum_agents().unwrap_or(0);
            min > b.total_assigned_agents && b.can_use_more_agents && under_max(b.maximum_agents(), b.total_assigned_agents)
        })
        .map(|(i, _)| i)
        .collect();
    under_minimum.sort_by_key(|&i| node.branches[i].total_assigned_agents);

    for i in under_minimum {
        if let Some(job_id) = place_one(&mut node.branches[i]) {
            node.record_placement();
            return Some(job_id);
        }
    }

    let mut priorities: Vec<i32> = node.branches.iter().map(|b| b.priority()).collect();
    priorities.sort_unstable();
    priorities.dedup();

    for priority in priorities.into_iter().rev() {
        let mut idxs: Vec<usize> = node.branches.iter().enumerate().filter(|(_, b)| b.priority() == priority).map(|(i, _)| i).collect();

        let weight_sum: f64 = idxs.iter().filter(|&&i| contributes_weight(&node.branches[i])).map(|&i| node.branches[i].effective_weight()).sum();
        let total_assigned: u32 = idxs.iter().map(|&i| node.branches[i].total_assigned_agents).sum();

        idxs.sort_by(|&a, &b| {
            fairness_score(&node.branches[a], total_assigned, weight_sum)
                .partial_cmp(&fairness_score(&node.branches[b], total_assigned, weight_sum))
                .unwrap_or(Ordering::Equal)
        });

        for i in idxs {
            let branch = &node.branches[i];
            if !branch.can_use_more_agents || !under_max(branch.maximum_agents(), branch.total_assigned_agents) {
                continue;
            }
            if let Some(job_id) = place_one(&mut node.branches[i]) {
                node.record_placement();
                return Some(job_id);
            }
        }
    }

    None
}

fn contributes_weight(branch: &Node) -> bool {
    matches!(&branch.source, NodeSource::Queue(_)) || matches!(branch.job().map(|j| j.state), Some(pyfarm_core::job::JobState::Running))
}

fn fairness_score(branch: &Node, total_assigned: u32, weight_sum: f64) -> f64 {
    let assigned_ratio = if total_assigned == 0 { 0.0 } else { branch.total_assigned_agents as f64 / total_assigned as f64 };
    let weight_ratio = if weight_sum == 0.0 { 1.0 } else { branch.effective_weight() / weight_sum };
    assigned_ratio / weight_ratio
}

fn under_max(maximum: Option<u32>, assigned: u32) -> bool {
    maximum.map_or(true, |max| assigned < max)
}

#[cfg(test)]
#[path = "allocator_tests.rs"]
mod tests;

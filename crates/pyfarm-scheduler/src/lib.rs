//! Scheduling algorithms: matching an idle agent to a job it can run right
//! now, and distributing a pool of interchangeable idle agents across a
//! queue tree by priority, weight, and minima. Both operate purely on the
//! [`pyfarm_store::Node`] snapshot handed in by the caller; neither crate
//! touches the store directly except through the read-only helpers the
//! matcher needs (software/jobtype lookups, parent-completion checks).

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used, clippy::panic))]

pub mod allocator;
pub mod matcher;

pub use allocator::{assign_agents_to_queue, Placement};
pub use matcher::{get_job_for_agent, select_batch_tasks, MatchSettings};

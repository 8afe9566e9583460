//! pyfarm-daemon: the periodic tasks and per-agent concurrency discipline
//! that turn the scheduler/dispatch libraries into a running master
//! (`spec.md` §4.7, §5).

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used, clippy::panic))]

pub mod cleanup;
pub mod lifecycle;
pub mod locks;
pub mod mail;
pub mod poller;
pub mod run;
pub mod tick;

pub use lifecycle::apply_task_change_and_notify;
pub use locks::{AgentLockRegistry, STALE_AFTER};
pub use run::{spawn_all, Daemon};

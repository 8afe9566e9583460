#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! pyfarm-store: in-memory entity store, task lifecycle hooks, and the
//! queue tree walker used to feed the scheduler's matching passes.

pub mod error;
pub mod lifecycle;
pub mod queue_tree;
pub mod state;

pub use error::StoreError;
pub use lifecycle::{apply_task_change, CompletionNotice, TaskChangeOutcome};
pub use queue_tree::{Node, NodeSource};
pub use state::EntityStore;

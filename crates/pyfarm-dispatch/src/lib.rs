//! HTTP dispatch to agents: `/assign`, `/tasks/`, `/tasks/<id>`, `/update`,
//! per `spec.md` §4.5/§6, plus the response-code disposition table of §7.

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used, clippy::panic))]

pub mod client;
pub mod dispatcher;
pub mod wire;

pub use client::{AgentClient, ClientError, HttpAgentClient, StatusOnly};
pub use dispatcher::{delete_task, schedule_deferred_deletion, send_tasks_to_agent, stop_task, update_agent, DispatchError};

#[cfg(any(test, feature = "test-support"))]
pub use client::fake::{FakeAgentClient, RecordedCall};

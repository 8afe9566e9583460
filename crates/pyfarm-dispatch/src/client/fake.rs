//! An in-memory [`AgentClient`] for exercising the dispatcher without a
//! socket, used by this crate's own tests and re-exported (behind
//! `test-support`) for `pyfarm-daemon`'s.

use async_trait::async_trait;
use parking_lot::Mutex;
use pyfarm_core::task::TaskId;

use super::{AgentClient, ClientError, StatusOnly};
use crate::wire::{AgentTaskSummary, AssignRequest};

/// One call the fake observed, for assertions.
#[derive(Debug, Clone)]
pub enum RecordedCall {
    Assign { address: String, port: u16, task_ids: Vec<TaskId> },
    ListTasks { address: String, port: u16 },
    StopTask { address: String, port: u16, task_id: TaskId },
    Update { address: String, port: u16, version: String },
}

/// Canned behavior for the next call of each kind. Defaults to a `200`.
#[derive(Debug, Clone, Default)]
pub struct FakeAgentClient {
    calls: std::sync::Arc<Mutex<Vec<RecordedCall>>>,
    assign_response: std::sync::Arc<Mutex<Option<Result<u16, ClientError>>>>,
    stop_response: std::sync::Arc<Mutex<Option<Result<u16, ClientError>>>>,
    update_response: std::sync::Arc<Mutex<Option<Result<u16, ClientError>>>>,
    tasks_response: std::sync::Arc<Mutex<Vec<AgentTaskSummary>>>,
}

impl FakeAgentClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_assign_status(&self, status: u16) {
        *self.assign_response.lock() = Some(Ok(status));
    }

    pub fn set_assign_unreachable(&self) {
        *self.assign_response.lock() = Some(Err(ClientError::Connection("connection refused".into())));
    }

    pub fn set_stop_status(&self, status: u16) {
        *self.stop_response.lock() = Some(Ok(status));
    }

    pub fn set_stop_unreachable(&self) {
        *self.stop_response.lock() = Some(Err(ClientError::Connection("connection refused".into())));
    }

    pub fn set_update_status(&self, status: u16) {
        *self.update_response.lock() = Some(Ok(status));
    }

    pub fn set_agent_tasks(&self, tasks: Vec<AgentTaskSummary>) {
        *self.tasks_response.lock() = tasks;
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl AgentClient for FakeAgentClient {
    async fn assign(&self, address: &str, port: u16, request: &AssignRequest) -> Result<StatusOnly, ClientError> {
        let task_ids = request.tasks.iter().map(|t| t.id).collect();
        self.calls.lock().push(RecordedCall::Assign { address: address.to_string(), port, task_ids });
        self.assign_response.lock().clone().unwrap_or(Ok(200)).map(StatusOnly)
    }

    async fn list_tasks(&self, address: &str, port: u16) -> Result<Vec<AgentTaskSummary>, ClientError> {
        self.calls.lock().push(RecordedCall::ListTasks { address: address.to_string(), port });
        Ok(self.tasks_response.lock().clone())
    }

    async fn stop_task(&self, address: &str, port: u16, task_id: TaskId) -> Result<StatusOnly, ClientError> {
        self.calls.lock().push(RecordedCall::StopTask { address: address.to_string(), port, task_id });
        self.stop_response.lock().clone().unwrap_or(Ok(200)).map(StatusOnly)
    }

    async fn update(&self, address: &str, port: u16, version: &str) -> Result<StatusOnly, ClientError> {
        self.calls.lock().push(RecordedCall::Update {
            address: address.to_string(),
            port,
            version: version.to_string(),
        });
        self.update_response.lock().clone().unwrap_or(Ok(200)).map(StatusOnly)
    }
}

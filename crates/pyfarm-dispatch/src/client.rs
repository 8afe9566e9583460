//! The agent HTTP control surface: one trait so the dispatcher can be
//! exercised against a fake in other crates' tests without a real socket.

use std::time::Duration;

use async_trait::async_trait;
use pyfarm_core::task::TaskId;
use thiserror::Error;

use crate::wire::{AgentTaskSummary, AssignRequest, UpdateRequest};

const USER_AGENT: &str = concat!("pyfarm-master/", env!("CARGO_PKG_VERSION"));

/// Failure talking to an agent. Distinct from [`crate::DispatchError`]:
/// this is the transport-level failure, which the dispatcher interprets
/// against the response-code disposition table in its own error type.
#[derive(Debug, Error, Clone)]
pub enum ClientError {
    #[error("connection to agent failed: {0}")]
    Connection(String),
}

/// One HTTP response, reduced to what the dispatcher needs to decide what
/// happened: the status code and, for `/tasks/`, the body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusOnly(pub u16);

#[async_trait]
pub trait AgentClient: Send + Sync {
    async fn assign(&self, address: &str, port: u16, request: &AssignRequest) -> Result<StatusOnly, ClientError>;

    async fn list_tasks(&self, address: &str, port: u16) -> Result<Vec<AgentTaskSummary>, ClientError>;

    async fn stop_task(&self, address: &str, port: u16, task_id: TaskId) -> Result<StatusOnly, ClientError>;

    async fn update(&self, address: &str, port: u16, version: &str) -> Result<StatusOnly, ClientError>;
}

/// Real agent client, talking plain HTTP per `spec.md` §6.
pub struct HttpAgentClient {
    http: reqwest::Client,
}

impl HttpAgentClient {
    #[allow(clippy::expect_used)]
    pub fn new(request_timeout: Duration) -> Self {
        let http = reqwest::Client::builder()
            .timeout(request_timeout)
            .user_agent(USER_AGENT)
            .build()
            .expect("reqwest client configuration is static and always valid");
        Self { http }
    }

    fn base_url(address: &str, port: u16) -> String {
        format!("http://{address}:{port}")
    }
}

#[async_trait]
impl AgentClient for HttpAgentClient {
    async fn assign(&self, address: &str, port: u16, request: &AssignRequest) -> Result<StatusOnly, ClientError> {
        let url = format!("{}/assign", Self::base_url(address, port));
        let response = self
            .http
            .post(&url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| ClientError::Connection(e.to_string()))?;
        Ok(StatusOnly(response.status().as_u16()))
    }

    async fn list_tasks(&self, address: &str, port: u16) -> Result<Vec<AgentTaskSummary>, ClientError> {
        let url = format!("{}/tasks/", Self::base_url(address, port));
        let response =
            self.http.get(&url).send().await.map_err(|e| ClientError::Connection(e.to_string()))?;
        if !response.status().is_success() {
            return Ok(Vec::new());
        }
        response.json().await.map_err(|e| ClientError::Connection(e.to_string()))
    }

    async fn stop_task(&self, address: &str, port: u16, task_id: TaskId) -> Result<StatusOnly, ClientError> {
        let url = format!("{}/tasks/{task_id}", Self::base_url(address, port));
        let response =
            self.http.delete(&url).send().await.map_err(|e| ClientError::Connection(e.to_string()))?;
        Ok(StatusOnly(response.status().as_u16()))
    }

    async fn update(&self, address: &str, port: u16, version: &str) -> Result<StatusOnly, ClientError> {
        let url = format!("{}/update", Self::base_url(address, port));
        let response = self
            .http
            .post(&url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .json(&UpdateRequest { version: version.to_string() })
            .send()
            .await
            .map_err(|e| ClientError::Connection(e.to_string()))?;
        Ok(StatusOnly(response.status().as_u16()))
    }
}

#[cfg(any(test, feature = "test-support"))]
pub mod fake;

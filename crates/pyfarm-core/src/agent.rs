//! Agent: a remote worker process reachable over HTTP that executes tasks.

use serde::{Deserialize, Serialize};

crate::define_id!(AgentId);

/// Liveness state. Transitions through `Offline`/`Disabled` revoke the
/// agent's claim on any task it was holding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentState {
    Online,
    Running,
    Offline,
    Disabled,
}

crate::simple_display! {
    AgentState {
        Online => "online",
        Running => "running",
        Offline => "offline",
        Disabled => "disabled",
    }
}

impl AgentState {
    /// An agent in this state can currently hold and execute work.
    pub fn is_available(self) -> bool {
        matches!(self, Self::Online | Self::Running)
    }
}

/// How the master should address this agent when dispatching work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UseAddress {
    /// Use `remote_ip` when present.
    Remote,
    /// Use `hostname`.
    Hostname,
    /// The agent polls for work itself; the master never connects out.
    Passive,
}

crate::simple_display! {
    UseAddress {
        Remote => "remote",
        Hostname => "hostname",
        Passive => "passive",
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agent {
    pub id: AgentId,
    pub hostname: String,
    pub ip: Option<String>,
    pub port: u16,
    pub remote_ip: Option<String>,

    pub cpus: u32,
    /// Total RAM in megabytes.
    pub ram: u32,
    /// Currently-free RAM in megabytes, as last reported by the agent.
    pub free_ram: u32,
    pub cpu_allocation: f64,
    pub ram_allocation: f64,

    pub state: AgentState,
    pub last_heard_from: Option<u64>,
    pub time_offset: i64,
    pub use_address: UseAddress,

    pub version: Option<String>,
    pub upgrade_to: Option<String>,

    pub tags: Vec<String>,
    pub software_version_ids: Vec<crate::software::SoftwareVersionId>,
    /// Job-type versions this agent can execute. An empty list means
    /// unrestricted (the agent supports every job-type version) rather than
    /// "supports nothing" — most agents never populate this.
    pub supported_jobtype_version_ids: Vec<crate::jobtype::JobTypeVersionId>,
}

impl Agent {
    /// RAM available for new work, per the `USE_TOTAL_RAM_FOR_SCHEDULING` knob.
    pub fn available_ram(&self, use_total: bool) -> u32 {
        if use_total {
            self.ram
        } else {
            self.free_ram
        }
    }

    /// The address the master should connect to when dispatching work to
    /// this agent, or `None` for a passive agent that must be polled for
    /// assignment instead.
    pub fn dispatch_address(&self) -> Option<String> {
        match self.use_address {
            UseAddress::Remote => self.remote_ip.clone().or_else(|| self.ip.clone()),
            UseAddress::Hostname => Some(self.hostname.clone()),
            UseAddress::Passive => None,
        }
    }

    pub fn supports_jobtype_version(&self, id: crate::jobtype::JobTypeVersionId) -> bool {
        self.supported_jobtype_version_ids.is_empty() || self.supported_jobtype_version_ids.contains(&id)
    }
}

crate::builder! {
    pub struct AgentBuilder => Agent {
        set {
            id: AgentId = AgentId::from_raw(1),
            port: u16 = 50000,
            cpus: u32 = 8,
            ram: u32 = 2048,
            free_ram: u32 = 2048,
            cpu_allocation: f64 = 1.0,
            ram_allocation: f64 = 1.0,
            state: AgentState = AgentState::Online,
            time_offset: i64 = 0,
            use_address: UseAddress = UseAddress::Hostname,
        }
        into { hostname: String = "agent-1" }
        option { ip: String = None, remote_ip: String = None, version: String = None, upgrade_to: String = None, last_heard_from: u64 = None }
        computed {
            tags: Vec<String> = Vec::new(),
            software_version_ids: Vec<crate::software::SoftwareVersionId> = Vec::new(),
            supported_jobtype_version_ids: Vec<crate::jobtype::JobTypeVersionId> = Vec::new(),
        }
    }
}

#[cfg(test)]
#[path = "agent_tests.rs"]
mod tests;

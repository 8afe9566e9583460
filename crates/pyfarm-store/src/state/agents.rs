//! Agent CRUD. `(hostname, port)` is unique (L1: idempotent upsert).

use pyfarm_core::agent::{Agent, AgentId, AgentState};

use crate::error::StoreError;

use super::EntityStore;

impl EntityStore {
    /// Insert a new agent, or update the existing one sharing `(hostname,
    /// port)` in place (L1). Returns the resulting agent's id either way.
    pub fn upsert_agent(&self, mut agent: Agent) -> AgentId {
        let mut inner = self.inner.write();
        let key = (agent.hostname.clone(), agent.port);
        if let Some(&existing_id) = inner.agents_by_hostname_port.get(&key) {
            agent.id = existing_id;
            inner.agents.insert(existing_id, agent);
            return existing_id;
        }
        inner.next_agent_id += 1;
        let id = AgentId::from_raw(inner.next_agent_id);
        agent.id = id;
        inner.agents_by_hostname_port.insert(key, id);
        inner.agents.insert(id, agent);
        id
    }

    pub fn get_agent(&self, id: AgentId) -> Result<Agent, StoreError> {
        self.inner
            .read()
            .agents
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("Agent", id))
    }

    pub fn update_agent(&self, agent: Agent) -> Result<(), StoreError> {
        let mut inner = self.inner.write();
        if !inner.agents.contains_key(&agent.id) {
            return Err(StoreError::not_found("Agent", agent.id));
        }
        inner.agents.insert(agent.id, agent);
        Ok(())
    }

    pub fn set_agent_state(&self, id: AgentId, state: AgentState) -> Result<(), StoreError> {
        let mut inner = self.inner.write();
        let agent = inner.agents.get_mut(&id).ok_or_else(|| StoreError::not_found("Agent", id))?;
        agent.state = state;
        Ok(())
    }

    pub fn list_agents(&self) -> Vec<Agent> {
        self.inner.read().agents.values().cloned().collect()
    }

    /// Agents in `Online` state holding no non-terminal task, per the
    /// scheduler tick's enumeration rule.
    pub fn idle_online_agents(&self) -> Vec<Agent> {
        let inner = self.inner.read();
        inner
            .agents
            .values()
            .filter(|a| a.state == AgentState::Online)
            .filter(|a| !inner.tasks.values().any(|t| t.agent_id == Some(a.id) && !t.state.is_terminal()))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use pyfarm_core::agent::Agent;

    use super::*;

    #[test]
    fn upsert_with_same_hostname_port_updates_in_place() {
        let store = EntityStore::new();
        let id1 = store.upsert_agent(Agent::builder().hostname("a").port(1).cpus(4).build());
        let id2 = store.upsert_agent(Agent::builder().hostname("a").port(1).cpus(8).build());
        assert_eq!(id1, id2);
        assert_eq!(store.get_agent(id1).unwrap().cpus, 8);
        assert_eq!(store.list_agents().len(), 1);
    }

    #[test]
    fn different_hostname_or_port_creates_a_new_agent() {
        let store = EntityStore::new();
        let id1 = store.upsert_agent(Agent::builder().hostname("a").port(1).build());
        let id2 = store.upsert_agent(Agent::builder().hostname("a").port(2).build());
        assert_ne!(id1, id2);
    }

    #[test]
    fn get_missing_agent_is_not_found() {
        let store = EntityStore::new();
        assert!(store.get_agent(AgentId::from_raw(999)).is_err());
    }
}

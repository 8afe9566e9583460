//! Software and software-version CRUD. `(Software.software)` is unique (L2:
//! tag-equivalence-style idempotent insert).

use pyfarm_core::software::{Software, SoftwareId, SoftwareVersion, SoftwareVersionId};

use crate::error::StoreError;

use super::EntityStore;

impl EntityStore {
    /// Insert software by name, or return the existing id for that name.
    pub fn upsert_software(&self, name: &str) -> SoftwareId {
        let mut inner = self.inner.write();
        if let Some(&id) = inner.software_by_name.get(name) {
            return id;
        }
        inner.next_software_id += 1;
        let id = SoftwareId::from_raw(inner.next_software_id);
        inner.software_by_name.insert(name.to_string(), id);
        inner.software.insert(id, Software { id, name: name.to_string() });
        id
    }

    pub fn insert_software_version(&self, software_id: SoftwareId, version: impl Into<String>, rank: i32) -> Result<SoftwareVersionId, StoreError> {
        let mut inner = self.inner.write();
        if !inner.software.contains_key(&software_id) {
            return Err(StoreError::not_found("Software", software_id));
        }
        inner.next_software_version_id += 1;
        let id = SoftwareVersionId::from_raw(inner.next_software_version_id);
        inner.software_versions.insert(id, SoftwareVersion { id, software_id, version: version.into(), rank });
        Ok(id)
    }

    pub fn software_versions_for_agent(&self, agent_id: pyfarm_core::agent::AgentId) -> Result<Vec<SoftwareVersion>, StoreError> {
        let inner = self.inner.read();
        let agent = inner.agents.get(&agent_id).ok_or_else(|| StoreError::not_found("Agent", agent_id))?;
        Ok(agent
            .software_version_ids
            .iter()
            .filter_map(|id| inner.software_versions.get(id).cloned())
            .collect())
    }
}

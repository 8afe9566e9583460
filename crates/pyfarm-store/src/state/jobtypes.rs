//! Job-type and job-type-version CRUD. `(JobType.name, version)` is unique.

use pyfarm_core::jobtype::{JobType, JobTypeId, JobTypeVersion, JobTypeVersionId};

use crate::error::StoreError;

use super::EntityStore;

impl EntityStore {
    pub fn upsert_jobtype(&self, name: &str) -> JobTypeId {
        let mut inner = self.inner.write();
        if let Some((&id, _)) = inner.jobtypes.iter().find(|(_, jt)| jt.name == name) {
            return id;
        }
        inner.next_jobtype_id += 1;
        let id = JobTypeId::from_raw(inner.next_jobtype_id);
        inner.jobtypes.insert(id, JobType { id, name: name.to_string() });
        id
    }

    pub fn insert_jobtype_version(&self, mut version: JobTypeVersion) -> Result<JobTypeVersionId, StoreError> {
        let mut inner = self.inner.write();
        if !inner.jobtypes.contains_key(&version.jobtype_id) {
            return Err(StoreError::not_found("JobType", version.jobtype_id));
        }
        let key = (version.jobtype_id, version.version);
        if inner.jobtype_versions_by_key.contains_key(&key) {
            return Err(StoreError::conflict(format!(
                "jobtype {} already has version {}",
                version.jobtype_id, version.version
            )));
        }
        inner.next_jobtype_version_id += 1;
        let id = JobTypeVersionId::from_raw(inner.next_jobtype_version_id);
        version.id = id;
        inner.jobtype_versions_by_key.insert(key, id);
        inner.jobtype_versions.insert(id, version);
        Ok(id)
    }

    pub fn get_jobtype_version(&self, id: JobTypeVersionId) -> Result<JobTypeVersion, StoreError> {
        self.inner
            .read()
            .jobtype_versions
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("JobTypeVersion", id))
    }

    pub fn get_jobtype(&self, id: JobTypeId) -> Result<JobType, StoreError> {
        self.inner.read().jobtypes.get(&id).cloned().ok_or_else(|| StoreError::not_found("JobType", id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_jobtype_version_is_a_conflict() {
        let store = EntityStore::new();
        let jt = store.upsert_jobtype("maya_render");
        let v = JobTypeVersion::builder().jobtype_id(jt).version(1).build();
        store.insert_jobtype_version(v.clone()).unwrap();
        assert!(store.insert_jobtype_version(v).is_err());
    }

    #[test]
    fn upserting_the_same_jobtype_name_twice_returns_the_same_id() {
        let store = EntityStore::new();
        assert_eq!(store.upsert_jobtype("x"), store.upsert_jobtype("x"));
    }
}

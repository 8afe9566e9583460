use pyfarm_core::agent::Agent;
use pyfarm_core::job::Job;

use super::*;

#[test]
fn a_fresh_store_has_no_entities() {
    let store = EntityStore::new();
    assert!(store.list_agents().is_empty());
}

#[test]
fn ids_across_entity_types_are_independent_counters() {
    let store = EntityStore::new();
    let agent = store.upsert_agent(Agent::builder().build());
    let job = store.insert_job(Job::builder().build());
    assert_eq!(agent.get(), 1);
    assert_eq!(job.get(), 1);
}

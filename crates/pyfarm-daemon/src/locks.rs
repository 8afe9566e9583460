//! Per-agent advisory lock registry: serializes `assign_to_agent` on a
//! given agent without blocking assignment to a different one. A lock
//! older than [`STALE_AFTER`] is broken by whoever next contends for it,
//! per `spec.md` §5's steal-after-60-s rule.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use pyfarm_core::agent::AgentId;

pub const STALE_AFTER: Duration = Duration::from_secs(60);

/// Holds the acquisition time of every currently-held agent lock.
#[derive(Default)]
pub struct AgentLockRegistry {
    held: Mutex<HashMap<AgentId, Instant>>,
}

/// An acquired lock; dropping it releases the agent for the next tick.
pub struct AgentLockGuard<'a> {
    registry: &'a AgentLockRegistry,
    agent_id: AgentId,
}

impl Drop for AgentLockGuard<'_> {
    fn drop(&mut self) {
        self.registry.held.lock().remove(&self.agent_id);
    }
}

impl AgentLockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Try to acquire the lock for `agent_id` at `now`. Fails only if
    /// another holder took it less than [`STALE_AFTER`] ago; a stale lock
    /// is silently broken and reacquired.
    pub fn try_acquire(&self, agent_id: AgentId, now: Instant) -> Option<AgentLockGuard<'_>> {
        let mut held = self.held.lock();
        if let Some(&acquired_at) = held.get(&agent_id) {
            if now.saturating_duration_since(acquired_at) < STALE_AFTER {
                return None;
            }
            tracing::warn!(%agent_id, "breaking stale agent lock");
        }
        held.insert(agent_id, now);
        drop(held);
        Some(AgentLockGuard { registry: self, agent_id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a_second_acquire_fails_while_the_first_guard_is_live() {
        let registry = AgentLockRegistry::new();
        let now = Instant::now();
        let _first = registry.try_acquire(AgentId::from_raw(1), now).unwrap();
        assert!(registry.try_acquire(AgentId::from_raw(1), now).is_none());
    }

    #[test]
    fn dropping_the_guard_releases_the_lock() {
        let registry = AgentLockRegistry::new();
        let now = Instant::now();
        {
            let _guard = registry.try_acquire(AgentId::from_raw(1), now).unwrap();
        }
        assert!(registry.try_acquire(AgentId::from_raw(1), now).is_some());
    }

    #[test]
    fn a_stale_lock_is_broken_and_reacquired() {
        let registry = AgentLockRegistry::new();
        let now = Instant::now();
        let first = registry.try_acquire(AgentId::from_raw(1), now).unwrap();
        let later = now + STALE_AFTER + Duration::from_secs(1);
        assert!(registry.try_acquire(AgentId::from_raw(1), later).is_some());
        drop(first);
    }

    #[test]
    fn different_agents_never_contend() {
        let registry = AgentLockRegistry::new();
        let now = Instant::now();
        let _a = registry.try_acquire(AgentId::from_raw(1), now).unwrap();
        assert!(registry.try_acquire(AgentId::from_raw(2), now).is_some());
    }
}

//! Shared test helpers for use across crates.
//!
//! Gated behind `#[cfg(any(test, feature = "test-support"))]`.

/// Proptest strategies for core state machine types.
#[cfg(feature = "proptest")]
pub mod strategies {
    use crate::agent::AgentState;
    use crate::job::JobState;
    use crate::task::TaskState;
    use proptest::prelude::*;

    pub fn arb_agent_state() -> impl Strategy<Value = AgentState> {
        prop_oneof![
            Just(AgentState::Online),
            Just(AgentState::Running),
            Just(AgentState::Offline),
            Just(AgentState::Disabled),
        ]
    }

    pub fn arb_job_state() -> impl Strategy<Value = JobState> {
        prop_oneof![
            Just(JobState::Queued),
            Just(JobState::Paused),
            Just(JobState::Running),
            Just(JobState::Done),
            Just(JobState::Failed),
        ]
    }

    pub fn arb_task_state() -> impl Strategy<Value = TaskState> {
        prop_oneof![
            Just(TaskState::Queued),
            Just(TaskState::Running),
            Just(TaskState::Done),
            Just(TaskState::Failed),
        ]
    }

    pub fn arb_frame() -> impl Strategy<Value = i64> {
        (0i64..10_000).prop_map(|f| f * crate::job::FRAME_SCALE)
    }
}

use super::*;

#[test]
fn unassigned_non_terminal_task_is_batchable() {
    let task = Task::builder().state(TaskState::Queued).build();
    assert!(task.is_batchable(false));
}

#[test]
fn assigned_task_is_not_batchable_unless_its_agent_is_unavailable() {
    let task = Task::builder().state(TaskState::Running).agent_id(AgentId::from_raw(1)).build();
    assert!(!task.is_batchable(false));
    assert!(task.is_batchable(true));
}

#[test]
fn terminal_task_is_never_batchable() {
    let done = Task::builder().state(TaskState::Done).build();
    assert!(!done.is_batchable(true));
    let failed = Task::builder().state(TaskState::Failed).build();
    assert!(!failed.is_batchable(true));
}

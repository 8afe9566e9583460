//! Composes the store's task-lifecycle hook with the daemon's own
//! completion-notification side effect, so every caller of this crate
//! (periodic tasks here, or the REST control plane this crate doesn't
//! implement) gets the full `spec.md` §4.6 behavior from one call.

use pyfarm_core::settings::Settings;
use pyfarm_core::task::{Task, TaskId};
use pyfarm_store::{EntityStore, StoreError, TaskChangeOutcome};

use crate::mail;

/// Apply `mutate` to one task's lifecycle, then send the completion mail if
/// the change rolled the job up to a terminal state.
pub fn apply_task_change_and_notify(
    store: &EntityStore,
    settings: &Settings,
    task_id: TaskId,
    now_ms: u64,
    mutate: impl FnOnce(&mut Task),
) -> Result<TaskChangeOutcome, StoreError> {
    let outcome = pyfarm_store::apply_task_change(store, task_id, now_ms, mutate)?;
    if outcome.notify.is_some() {
        mail::notify_job_completion(settings, &outcome.job);
    }
    Ok(outcome)
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;

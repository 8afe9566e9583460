//! Orphan task-log cleanup, per `spec.md` §4.7. Deferred job deletion lives
//! in `pyfarm_dispatch::dispatcher`, wired directly into `delete_task`.

use std::path::Path;

use pyfarm_store::EntityStore;

/// Remove every `TaskLog` row with no referencing association, then sweep
/// `logfiles_dir` for files with no registered row. Both stages tolerate a
/// missing directory/file: cleanup never fails because someone beat it to
/// the punch.
pub fn cleanup_orphan_logs(store: &EntityStore, logfiles_dir: &Path) {
    for identifier in store.orphaned_tasklogs() {
        store.remove_tasklog(&identifier);
        remove_log_file(logfiles_dir, identifier.as_str());
    }

    let entries = match std::fs::read_dir(logfiles_dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return,
        Err(e) => {
            tracing::warn!(dir = %logfiles_dir.display(), error = %e, "could not list logfiles dir");
            return;
        }
    };

    for entry in entries.flatten() {
        let file_name = entry.file_name();
        let name = file_name.to_string_lossy();
        let base = name.strip_suffix(".gz").unwrap_or(&name);
        if !store.tasklog_is_registered(base) {
            remove_if_present(&entry.path());
        }
    }
}

fn remove_log_file(logfiles_dir: &Path, identifier: &str) {
    remove_if_present(&logfiles_dir.join(identifier));
    remove_if_present(&logfiles_dir.join(format!("{identifier}.gz")));
}

fn remove_if_present(path: &Path) {
    if let Err(e) = std::fs::remove_file(path) {
        if e.kind() != std::io::ErrorKind::NotFound {
            tracing::warn!(path = %path.display(), error = %e, "could not remove orphaned log file");
        }
    }
}

#[cfg(test)]
#[path = "cleanup_tests.rs"]
mod tests;

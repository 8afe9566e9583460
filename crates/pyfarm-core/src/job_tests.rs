use super::*;

#[test]
fn zero_weight_treated_as_one() {
    let job = Job::builder().weight(0).build();
    assert_eq!(job.effective_weight(), 1.0);
}

#[test]
fn done_and_failed_are_terminal_others_are_not() {
    assert!(JobState::Done.is_terminal());
    assert!(JobState::Failed.is_terminal());
    assert!(!JobState::Queued.is_terminal());
    assert!(!JobState::Running.is_terminal());
    assert!(!JobState::Paused.is_terminal());
}

#[test]
fn runnable_requires_queued_or_running_and_parents_done() {
    let queued = Job::builder().state(JobState::Queued).build();
    assert!(queued.is_runnable(true));
    assert!(!queued.is_runnable(false));

    let paused = Job::builder().state(JobState::Paused).build();
    assert!(!paused.is_runnable(true));

    let done = Job::builder().state(JobState::Done).build();
    assert!(!done.is_runnable(true));
}

#[test]
fn frame_scale_keeps_fractional_frame_steps_exact() {
    // by = 0.5 frames
    let job = Job::builder().by(FRAME_SCALE / 2).build();
    let next_frame = FRAME_SCALE + job.by;
    assert_eq!(next_frame, FRAME_SCALE * 3 / 2);
}

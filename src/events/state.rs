//! Job states and the event record carried along the notification path.

use std::fmt;
use std::sync::Arc;

/// Condition of a tracked cluster job.
///
/// `Pending` is the default for jobs whose condition is unknown or not yet
/// reported; the watch loop treats it like `Running` (non-terminal).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JobState {
    /// Unknown or not-yet-reported condition.
    #[default]
    Pending,
    /// The job is executing.
    Running,
    /// Terminal: the job finished successfully.
    Complete,
    /// Terminal: the job failed.
    Failed,
}

impl JobState {
    /// True for [`JobState::Complete`] and [`JobState::Failed`], the two
    /// states that end a watch loop.
    #[inline]
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobState::Complete | JobState::Failed)
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            JobState::Pending => "pending",
            JobState::Running => "running",
            JobState::Complete => "complete",
            JobState::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// One job-state transition, as observed by the cluster job watcher.
///
/// Immutable once constructed and passed by value along the notification
/// path; fields are `Arc<str>` so the per-subscriber clones made during
/// fan-out are cheap.
#[derive(Debug, Clone)]
pub struct StateEvent {
    /// Identifier of the originating backup/check/prune resource.
    pub subject_id: Arc<str>,
    /// Observed job condition.
    pub state: JobState,
    /// Name of the storage backend the job targets. Used as the admission
    /// class key when the watch loop reserves a slot.
    pub repository: Arc<str>,
}

impl StateEvent {
    /// Creates an event with an empty repository.
    pub fn new(subject_id: impl Into<Arc<str>>, state: JobState) -> Self {
        Self {
            subject_id: subject_id.into(),
            state,
            repository: Arc::from(""),
        }
    }

    /// Attaches the storage backend this job targets.
    #[inline]
    pub fn with_repository(mut self, repository: impl Into<Arc<str>>) -> Self {
        self.repository = repository.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_states() {
        assert!(JobState::Complete.is_terminal());
        assert!(JobState::Failed.is_terminal());
        assert!(!JobState::Running.is_terminal());
        assert!(!JobState::Pending.is_terminal());
        assert_eq!(JobState::default(), JobState::Pending);
    }

    #[test]
    fn event_builder() {
        let ev = StateEvent::new("backup-1", JobState::Running).with_repository("s3:bucket");
        assert_eq!(ev.subject_id.as_ref(), "backup-1");
        assert_eq!(ev.state, JobState::Running);
        assert_eq!(ev.repository.as_ref(), "s3:bucket");
    }
}

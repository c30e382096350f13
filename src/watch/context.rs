//! Per-job wiring consumed by one watch loop.

use std::sync::Arc;

use crate::events::StateEvent;
use crate::locker::{JobName, Locker};

/// Best-effort hook invoked on a state transition.
///
/// Hooks run inside the watch loop under panic isolation: a panicking hook
/// is logged and never prevents slot release, metric recording, or
/// unsubscription. There is no error path by design.
pub type StateHook = Box<dyn Fn(&StateEvent) + Send + Sync>;

/// Everything a watch loop needs to track one cluster job.
///
/// Created by the event source when it begins watching a job, consumed for
/// the duration of one loop, discarded on the terminal transition. The
/// hooks are optional; services attach only the reactions they need.
pub struct WatchContext {
    /// Namespace of the tracked job.
    pub namespace: String,
    /// Name of the tracked job.
    pub name: String,
    /// Class label used for admission and the `jobType` metrics label.
    pub job_name: JobName,
    /// Admission-control handle; slots are reserved/released through it.
    pub locker: Arc<dyn Locker>,

    pub(crate) on_success: Option<StateHook>,
    pub(crate) on_failure: Option<StateHook>,
    pub(crate) on_running: Option<StateHook>,
    pub(crate) on_default: Option<StateHook>,
}

impl WatchContext {
    /// Builds a context with no hooks attached.
    pub fn new(
        namespace: impl Into<String>,
        name: impl Into<String>,
        job_name: JobName,
        locker: Arc<dyn Locker>,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
            job_name,
            locker,
            on_success: None,
            on_failure: None,
            on_running: None,
            on_default: None,
        }
    }

    /// Hook for the `Complete` transition.
    pub fn with_on_success(mut self, f: impl Fn(&StateEvent) + Send + Sync + 'static) -> Self {
        self.on_success = Some(Box::new(f));
        self
    }

    /// Hook for the `Failed` transition.
    pub fn with_on_failure(mut self, f: impl Fn(&StateEvent) + Send + Sync + 'static) -> Self {
        self.on_failure = Some(Box::new(f));
        self
    }

    /// Hook for `Running` events.
    pub fn with_on_running(mut self, f: impl Fn(&StateEvent) + Send + Sync + 'static) -> Self {
        self.on_running = Some(Box::new(f));
        self
    }

    /// Hook for non-terminal events that are not `Running` (pending/unknown).
    pub fn with_on_default(mut self, f: impl Fn(&StateEvent) + Send + Sync + 'static) -> Self {
        self.on_default = Some(Box::new(f));
        self
    }

    /// `namespace/name`, the identity used in log lines.
    pub(crate) fn job_id(&self) -> String {
        format!("{}/{}", self.namespace, self.name)
    }
}

//! Job outcome counters, labeled `{namespace, jobType}`.
//!
//! Three monotonic counters: total jobs observed, successes, failures.
//! [`JobMetrics::initialize`] is called once at the start of each watch so
//! the success/failure children exist at zero before any increment —
//! otherwise rate-of-change computation over the counters shows a misleading
//! jump from "absent" straight to 1.

use prometheus::{IntCounterVec, Opts, Registry};

const LABELS: &[&str] = &["namespace", "jobType"];

/// Counter bundle for job outcomes.
///
/// Register once per process against the registry the metrics endpoint
/// exports, then share behind an `Arc` with every watch loop.
pub struct JobMetrics {
    total: IntCounterVec,
    success: IntCounterVec,
    failure: IntCounterVec,
}

impl JobMetrics {
    /// Creates the counter vectors and registers them on `registry`.
    pub fn new(registry: &Registry) -> Result<Self, prometheus::Error> {
        let total = IntCounterVec::new(
            Opts::new("jobs_total", "The total amount of all jobs run"),
            LABELS,
        )?;
        let success = IntCounterVec::new(
            Opts::new(
                "jobs_successful_total",
                "The total number of jobs that went through cleanly",
            ),
            LABELS,
        )?;
        let failure = IntCounterVec::new(
            Opts::new("jobs_failed_total", "The total number of jobs that failed"),
            LABELS,
        )?;

        registry.register(Box::new(total.clone()))?;
        registry.register(Box::new(success.clone()))?;
        registry.register(Box::new(failure.clone()))?;

        Ok(Self {
            total,
            success,
            failure,
        })
    }

    /// Registers the `(namespace, jobType)` label pair at zero on the
    /// success and failure counters. Called once per watch, before any
    /// increment.
    pub fn initialize(&self, namespace: &str, job_type: &str) {
        self.success.with_label_values(&[namespace, job_type]).inc_by(0);
        self.failure.with_label_values(&[namespace, job_type]).inc_by(0);
    }

    /// Records one successful job (success + total).
    pub fn record_success(&self, namespace: &str, job_type: &str) {
        self.success.with_label_values(&[namespace, job_type]).inc();
        self.total.with_label_values(&[namespace, job_type]).inc();
    }

    /// Records one failed job (failure + total).
    pub fn record_failure(&self, namespace: &str, job_type: &str) {
        self.failure.with_label_values(&[namespace, job_type]).inc();
        self.total.with_label_values(&[namespace, job_type]).inc();
    }

    #[cfg(test)]
    pub(crate) fn snapshot(&self, namespace: &str, job_type: &str) -> (u64, u64, u64) {
        (
            self.total.with_label_values(&[namespace, job_type]).get(),
            self.success.with_label_values(&[namespace, job_type]).get(),
            self.failure.with_label_values(&[namespace, job_type]).get(),
        )
    }
}

//! # Admission control: the Locker contract.
//!
//! The controller bounds how many jobs of a given class may run in the
//! cluster at once. A watch loop reserves one slot when it first sees its job
//! running ([`Locker::increment`]) and releases it on the terminal transition
//! ([`Locker::decrement`]). The contract the loops uphold:
//!
//! - reserve **before** treating the job as running, at most once per loop;
//! - release at most once, and only a slot that was actually reserved;
//! - never hold a reservation past the loop's terminal transition.
//!
//! A job whose channel closes without a terminal event keeps its slot
//! reserved; reclaiming such slots is restart-reconciliation territory,
//! outside this crate.
//!
//! [`SemaphoreLocker`] is the in-process default, suitable for tests and
//! single-process embedding. Controllers that coordinate admission across
//! replicas supply their own [`Locker`].

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Semaphore;

/// Class label of a job ("backup", "check", "prune", ...). Doubles as the
/// `jobType` metrics label.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JobName(Arc<str>);

impl JobName {
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for JobName {
    fn from(s: &str) -> Self {
        Self(Arc::from(s))
    }
}

impl From<String> for JobName {
    fn from(s: String) -> Self {
        Self(Arc::from(s.as_str()))
    }
}

impl std::fmt::Display for JobName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque descriptor of one slot reservation.
///
/// Returned by [`Locker::increment`] and required to release the slot later.
/// Carries the class name (for metrics labels) and the backend the
/// reservation was keyed on.
#[derive(Debug, Clone)]
pub struct JobType {
    name: JobName,
    backend: Arc<str>,
}

impl JobType {
    /// Builds a descriptor for the given class and backend key.
    pub fn new(name: JobName, backend: impl Into<Arc<str>>) -> Self {
        Self {
            name,
            backend: backend.into(),
        }
    }

    /// Class label of the reservation.
    #[inline]
    pub fn name(&self) -> &JobName {
        &self.name
    }

    /// Backend key the reservation was made under.
    #[inline]
    pub fn backend(&self) -> &str {
        &self.backend
    }

    /// Key identifying the admission class: one slot pool per
    /// backend/class pair.
    pub(crate) fn key(&self) -> String {
        format!("{}/{}", self.backend, self.name)
    }
}

/// Admission-control primitive bounding concurrent jobs per class.
///
/// Implementations may count slots in-process or against shared state; the
/// watch loops only require the reserve/release semantics below.
#[async_trait]
pub trait Locker: Send + Sync {
    /// Reserves one slot for the `(backend, job)` class, waiting if the
    /// class is at its configured maximum. Returns the descriptor needed to
    /// release the slot.
    async fn increment(&self, backend: &str, job: &JobName) -> JobType;

    /// Releases exactly one previously reserved slot.
    async fn decrement(&self, job_type: &JobType);
}

/// In-process [`Locker`] backed by one semaphore per admission class.
///
/// Every `(backend, job)` pair gets its own pool of `max_concurrent`
/// permits, created lazily on first reservation. `increment` awaits a
/// permit and forgets it; `decrement` adds the permit back.
pub struct SemaphoreLocker {
    max_concurrent: usize,
    slots: Mutex<HashMap<String, Arc<Semaphore>>>,
}

impl SemaphoreLocker {
    /// Creates a locker allowing `max_concurrent` jobs per class
    /// (clamped to a minimum of 1).
    pub fn new(max_concurrent: usize) -> Self {
        Self {
            max_concurrent: max_concurrent.max(1),
            slots: Mutex::new(HashMap::new()),
        }
    }

    fn pool(&self, key: &str) -> Arc<Semaphore> {
        let mut slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
        slots
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(Semaphore::new(self.max_concurrent)))
            .clone()
    }
}

#[async_trait]
impl Locker for SemaphoreLocker {
    async fn increment(&self, backend: &str, job: &JobName) -> JobType {
        let descriptor = JobType::new(job.clone(), backend);
        let pool = self.pool(&descriptor.key());
        // The semaphore is never closed, so acquire only fails if we closed
        // it ourselves; treat an error like an immediately available permit.
        if let Ok(permit) = pool.acquire().await {
            permit.forget();
        }
        descriptor
    }

    async fn decrement(&self, job_type: &JobType) {
        let pool = self.pool(&job_type.key());
        pool.add_permits(1);
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::time::timeout;

    use super::*;

    #[tokio::test]
    async fn bounds_concurrency_per_class() {
        let locker = SemaphoreLocker::new(1);
        let job = JobName::from("backup");

        let held = locker.increment("s3:bucket", &job).await;

        // Second reservation for the same class must wait.
        let blocked = timeout(
            Duration::from_millis(50),
            locker.increment("s3:bucket", &job),
        )
        .await;
        assert!(blocked.is_err(), "second slot must not be granted");

        // A different backend is a different class and admits immediately.
        let other = timeout(
            Duration::from_millis(50),
            locker.increment("s3:other", &job),
        )
        .await
        .expect("distinct class admits");
        locker.decrement(&other).await;

        // Releasing the held slot unblocks the class.
        locker.decrement(&held).await;
        let granted = timeout(
            Duration::from_millis(50),
            locker.increment("s3:bucket", &job),
        )
        .await
        .expect("slot freed by decrement");
        assert_eq!(granted.name().as_str(), "backup");
        assert_eq!(granted.backend(), "s3:bucket");
    }
}

//! # jobwatch
//!
//! **jobwatch** is the concurrency-coordination core of a backup-orchestration
//! controller. It tracks cluster jobs (backup, check, prune) through a
//! topic-based publish/subscribe broker, drives one watch loop per tracked job,
//! and bounds concurrent execution through an admission-control contract.
//!
//! ## Architecture
//! ```text
//!   cluster job watcher (external)
//!            │
//!            │ Broker::notify(topic, StateEvent)
//!            ▼
//! ┌─────────────────────────────────────────────────────────┐
//! │  Broker (topic → subscriber registry, mutex-guarded)    │
//! │  - subscribe / unsubscribe / notify                     │
//! │  - one spawned delivery task per subscriber per event   │
//! └──────┬───────────────────┬──────────────────┬───────────┘
//!        ▼                   ▼                  ▼
//!  [chan cap=1]        [chan cap=1]        [chan cap=1]
//!        │                   │                  │
//!        ▼                   ▼                  ▼
//!  watch loop #1       watch loop #2       watch loop #N
//!  (per-job FSM)       (per-job FSM)       (per-job FSM)
//!        │                   │                  │
//!        ├── hooks (on_running / on_success / on_failure)
//!        ├── Locker::increment / decrement   (admission slots)
//!        └── JobMetrics (total/success/failure counters)
//! ```
//!
//! ## Lifecycle
//! ```text
//! subscribe(topic) ──► Subscription ──► watch(broker, sub, ctx, metrics)
//!
//! loop {
//!   ├─► recv StateEvent
//!   ├─ non-terminal ──► first one: Locker::increment ──► JobType descriptor
//!   │                   later ones: no-op on the locker
//!   ├─ Complete ──► on_success, Locker::decrement, record_success, exit
//!   └─ Failed   ──► on_failure, Locker::decrement, record_failure, exit
//! }
//! on exit (any path): unsubscribe from the broker (drop guard, exactly once)
//! ```
//!
//! ## Rules
//! - The broker registry is the only shared mutable state; its lock is never
//!   held across a channel send.
//! - Subscriber channels have capacity 1: delivery is synchronous with the
//!   subscriber's consumption, which is the backpressure mechanism.
//! - Ordering across separate `notify` calls to the same subscriber is **not**
//!   guaranteed; the per-job event source serializes its own transitions.
//! - A watch loop reserves at most one admission slot and releases it at most
//!   once; if its channel closes before a terminal event, the slot stays
//!   reserved (restart reconciliation is out of scope here).
//!
//! ## Example
//! ```no_run
//! use std::sync::Arc;
//! use jobwatch::{Broker, JobMetrics, JobName, JobState, SemaphoreLocker, StateEvent, WatchContext};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let broker = Arc::new(Broker::new());
//!     let locker = Arc::new(SemaphoreLocker::new(1));
//!     let registry = prometheus::Registry::new();
//!     let metrics = Arc::new(JobMetrics::new(&registry)?);
//!
//!     let sub = broker.subscribe("job-topic")?;
//!     let ctx = WatchContext::new("default", "backup-job", JobName::from("backup"), locker)
//!         .with_on_success(|ev| println!("done: {}", ev.subject_id));
//!
//!     let handle = tokio::spawn(jobwatch::watch(broker.clone(), sub, ctx, metrics));
//!
//!     broker.notify("job-topic", StateEvent::new("backup-1", JobState::Running))?;
//!     broker.notify("job-topic", StateEvent::new("backup-1", JobState::Complete))?;
//!     handle.await?;
//!     Ok(())
//! }
//! ```

mod config;
mod error;
mod events;
mod locker;
mod metrics;
mod watch;

// ---- Public re-exports ----

pub use config::Config;
pub use error::BrokerError;
pub use events::{Broker, JobState, StateEvent, SubscriberId, Subscription};
pub use locker::{JobName, JobType, Locker, SemaphoreLocker};
pub use metrics::JobMetrics;
pub use watch::{watch, StateHook, WatchContext};

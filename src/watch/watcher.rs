//! # The per-job watch loop state machine.
//!
//! ## States and transitions
//! ```text
//! pending/running ──► running:  first non-terminal event reserves the
//!                               admission slot (Locker::increment);
//!                               later non-terminal events are locker no-ops
//! running ──► Complete:  on_success, Locker::decrement, success+total metric
//! running ──► Failed:    on_failure, Locker::decrement, failure+total metric
//! channel closed:        stop consuming; no decrement (slot stays reserved)
//! ```
//!
//! ## Rules
//! - Unsubscription runs on every exit path exactly once, via a drop guard.
//! - Hooks are best-effort: panics are caught and logged, and never prevent
//!   slot release, metric recording, or unsubscription.
//! - The loop never reserves more than one slot and never releases a slot
//!   it does not hold.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use tracing::{error, info, warn};

use crate::events::{Broker, JobState, StateEvent, SubscriberId, Subscription};
use crate::locker::JobType;
use crate::metrics::JobMetrics;

use super::context::{StateHook, WatchContext};

/// Unsubscribes from the broker when dropped.
///
/// The loop has several exit paths (both terminal states plus external
/// channel closure); tying the unsubscribe to scope exit makes "exactly
/// once" structural instead of a cleanup step each path must remember.
struct UnsubscribeGuard {
    broker: Arc<Broker>,
    topic: String,
    id: SubscriberId,
}

impl Drop for UnsubscribeGuard {
    fn drop(&mut self) {
        self.broker.unsubscribe(&self.topic, self.id);
    }
}

/// Runs the watch loop for one subscription until a terminal state arrives
/// or the channel is closed externally.
///
/// Consumes the subscription and the context; on return the subscription has
/// been removed from the broker. Typically spawned:
/// `tokio::spawn(watch(broker, sub, ctx, metrics))`.
pub async fn watch(
    broker: Arc<Broker>,
    mut sub: Subscription,
    ctx: WatchContext,
    metrics: Arc<JobMetrics>,
) {
    let _guard = UnsubscribeGuard {
        broker,
        topic: sub.topic().to_string(),
        id: sub.id(),
    };

    let job_id = ctx.job_id();
    let mut reservation: Option<JobType> = None;

    // Touch the counters at zero before anything increments them, so rate
    // computation never sees an absent-to-1 jump.
    metrics.initialize(&ctx.namespace, ctx.job_name.as_str());

    while let Some(event) = sub.recv().await {
        match event.state {
            JobState::Failed => {
                error!(job = %job_id, "job failed");
                run_hook(&ctx.on_failure, &event, "on_failure");
                if let Some(job_type) = reservation.take() {
                    ctx.locker.decrement(&job_type).await;
                }
                metrics.record_failure(&ctx.namespace, ctx.job_name.as_str());
                return;
            }
            JobState::Complete => {
                info!(job = %job_id, "job finished successfully");
                run_hook(&ctx.on_success, &event, "on_success");
                if let Some(job_type) = reservation.take() {
                    ctx.locker.decrement(&job_type).await;
                }
                metrics.record_success(&ctx.namespace, ctx.job_name.as_str());
                return;
            }
            state => {
                info!(job = %job_id, %state, "job is running");
                if reservation.is_none() {
                    reservation =
                        Some(ctx.locker.increment(&event.repository, &ctx.job_name).await);
                }
                let (hook, label) = if state == JobState::Running {
                    (&ctx.on_running, "on_running")
                } else {
                    (&ctx.on_default, "on_default")
                };
                run_hook(hook, &event, label);
            }
        }
    }
    // Channel closed without a terminal event (external unsubscribe or
    // controller shutdown). The reservation, if any, stays held: reclaiming
    // it is restart reconciliation, which lives outside this core.
}

/// Invokes an optional hook under panic isolation.
fn run_hook(hook: &Option<StateHook>, event: &StateEvent, label: &str) {
    if let Some(f) = hook {
        if catch_unwind(AssertUnwindSafe(|| f(event))).is_err() {
            warn!(subject = %event.subject_id, hook = label, "watch hook panicked");
        }
    }
}

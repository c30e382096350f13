//! # Topic registry with fan-out notification.
//!
//! [`Broker`] maps topics to lists of subscribers and notifies every
//! subscriber of a topic independently. One topic exists per tracked
//! backup-type resource; the resource is assigned its topic externally at
//! creation time (typically a random identifier).
//!
//! ## Architecture
//! ```text
//! notify(topic, ev)
//!     │  lock ── look up topic, clone senders ── unlock
//!     │
//!     ├── tokio::spawn ── tx₁.send(ev)  ──► subscriber 1 (cap-1 channel)
//!     ├── tokio::spawn ── tx₂.send(ev)  ──► subscriber 2
//!     └── tokio::spawn ── txₙ.send(ev)  ──► subscriber N
//! ```
//!
//! ## Rules
//! - The registry mutex is held only for lookups and mutations, never across
//!   a channel send.
//! - Each delivery is its own spawned task: a stalled subscriber parks its
//!   own delivery, not the notifier and not other subscribers.
//! - Because deliveries are independent tasks, ordering across separate
//!   `notify` calls to the *same* subscriber is not guaranteed. The per-job
//!   event source serializes its own transitions; the broker does not.
//! - Topics are created lazily on first subscribe. The empty subscriber list
//!   left after the last unsubscribe is tolerated, not pruned, so a notify
//!   on such a topic is a successful no-op rather than an unknown-topic error.
//!
//! ## Construction
//! The process holds exactly one `Broker`, built at startup and shared as
//! `Arc<Broker>` with the event source and every watch loop. There is no
//! global accessor.

use std::collections::HashMap;
use std::sync::Mutex;

use tokio::sync::mpsc;
use tracing::debug;

use crate::error::BrokerError;

use super::state::StateEvent;
use super::subscription::{SubscriberId, Subscription};

/// Retry budget for the random subscriber-id draw. Collisions over a `u32`
/// space are already vanishingly unlikely with a handful of subscribers per
/// topic; exhausting this budget indicates an internal fault.
const MAX_ID_DRAWS: usize = 64;

/// Send half of a registration, as stored in the registry.
struct Registration {
    id: SubscriberId,
    tx: mpsc::Sender<StateEvent>,
}

/// Thread-safe topic → subscribers registry with fan-out notify.
///
/// Cheap to share behind an `Arc`; all methods take `&self`.
pub struct Broker {
    topics: Mutex<HashMap<String, Vec<Registration>>>,
}

impl Broker {
    /// Creates an empty broker.
    pub fn new() -> Self {
        Self {
            topics: Mutex::new(HashMap::new()),
        }
    }

    /// Registers a new subscriber under `topic` and returns the receive half.
    ///
    /// The topic entry is created on first use. The subscriber id is drawn
    /// randomly and re-drawn on collision with any live id in the topic,
    /// up to a fixed retry budget; exhaustion surfaces as
    /// [`BrokerError::RegistrationExhausted`].
    ///
    /// The channel has capacity 1, making delivery synchronous with the
    /// subscriber's consumption.
    pub fn subscribe(&self, topic: &str) -> Result<Subscription, BrokerError> {
        let mut topics = self.topics.lock().unwrap_or_else(|e| e.into_inner());
        let subs = topics.entry(topic.to_string()).or_default();

        let id = Self::draw_id(subs).ok_or_else(|| BrokerError::RegistrationExhausted {
            topic: topic.to_string(),
        })?;

        let (tx, rx) = mpsc::channel(1);
        subs.push(Registration { id, tx });
        debug!(topic, id, subscribers = subs.len(), "subscribed");

        Ok(Subscription {
            id,
            topic: topic.to_string(),
            rx,
        })
    }

    /// Removes the subscriber `id` from `topic` and closes its channel.
    ///
    /// Dropping the send half is what signals the watch loop to stop: its
    /// `recv` returns `None` once the buffer drains. Unknown topics and
    /// unknown ids are silent no-ops, tolerating double-unsubscribe and
    /// stale references left over from a controller restart.
    pub fn unsubscribe(&self, topic: &str, id: SubscriberId) {
        let mut topics = self.topics.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(subs) = topics.get_mut(topic) {
            let before = subs.len();
            subs.retain(|s| s.id != id);
            if subs.len() < before {
                debug!(topic, id, "unsubscribed");
            }
        }
    }

    /// Delivers `event` to every current subscriber of `topic`.
    ///
    /// Each delivery runs as its own spawned task so that no subscriber can
    /// block another, or the notifier. Must be called from within a Tokio
    /// runtime.
    ///
    /// Unknown topics: an empty topic name is a deliberate no-op (resources
    /// that have not yet subscribed produce it); any other unknown topic is
    /// reported as [`BrokerError::UnknownTopic`]. That error is expected
    /// while stale job watchers outlive a controller restart — log it and
    /// continue.
    pub fn notify(&self, topic: &str, event: StateEvent) -> Result<(), BrokerError> {
        let senders: Vec<mpsc::Sender<StateEvent>> = {
            let topics = self.topics.lock().unwrap_or_else(|e| e.into_inner());
            match topics.get(topic) {
                Some(subs) => subs.iter().map(|s| s.tx.clone()).collect(),
                None if topic.is_empty() => return Ok(()),
                None => {
                    return Err(BrokerError::UnknownTopic {
                        topic: topic.to_string(),
                    });
                }
            }
        };

        for tx in senders {
            let ev = event.clone();
            tokio::spawn(async move {
                // Receiver gone (unsubscribed mid-flight): nothing to do.
                let _ = tx.send(ev).await;
            });
        }
        Ok(())
    }

    /// Number of live subscribers on `topic`. Zero for unknown topics.
    pub fn subscriber_count(&self, topic: &str) -> usize {
        let topics = self.topics.lock().unwrap_or_else(|e| e.into_inner());
        topics.get(topic).map_or(0, Vec::len)
    }

    /// Draws an id that does not collide with any live registration.
    fn draw_id(subs: &[Registration]) -> Option<SubscriberId> {
        for _ in 0..MAX_ID_DRAWS {
            let candidate: SubscriberId = rand::random();
            if !subs.iter().any(|s| s.id == candidate) {
                return Some(candidate);
            }
        }
        None
    }
}

impl Default for Broker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::events::JobState;

    #[test]
    fn ids_are_distinct_within_a_topic() {
        let broker = Broker::new();
        let subs: Vec<Subscription> = (0..100)
            .map(|_| broker.subscribe("topic").expect("subscribe"))
            .collect();

        let ids: HashSet<SubscriberId> = subs.iter().map(Subscription::id).collect();
        assert_eq!(ids.len(), subs.len());
        assert_eq!(broker.subscriber_count("topic"), 100);
    }

    #[tokio::test]
    async fn notify_reaches_every_subscriber() {
        let broker = Broker::new();
        let mut subs: Vec<Subscription> = (0..3)
            .map(|_| broker.subscribe("fanout").expect("subscribe"))
            .collect();

        broker
            .notify("fanout", StateEvent::new("job-a", JobState::Running))
            .expect("notify");

        for sub in &mut subs {
            let ev = sub.recv().await.expect("delivery");
            assert_eq!(ev.subject_id.as_ref(), "job-a");
            assert_eq!(ev.state, JobState::Running);
        }
    }

    #[tokio::test]
    async fn per_subscriber_order_is_kept_for_serialized_notifies() {
        let broker = Broker::new();
        let mut sub = broker.subscribe("ordered").expect("subscribe");

        for state in [JobState::Pending, JobState::Running, JobState::Complete] {
            broker
                .notify("ordered", StateEvent::new("job-b", state))
                .expect("notify");
            // Serialize: wait for the delivery task to hand the event over
            // before issuing the next notify.
            let ev = sub.recv().await.expect("delivery");
            assert_eq!(ev.state, state);
        }
    }

    #[tokio::test]
    async fn unknown_topic_errors_and_empty_topic_is_benign() {
        let broker = Broker::new();

        let err = broker
            .notify("nobody-home", StateEvent::new("x", JobState::Running))
            .expect_err("unknown topic must error");
        assert_eq!(
            err,
            BrokerError::UnknownTopic {
                topic: "nobody-home".into()
            }
        );
        assert!(err.to_string().contains("nobody-home"));
        assert_eq!(err.as_label(), "unknown_topic");

        broker
            .notify("", StateEvent::new("x", JobState::Running))
            .expect("empty topic is a no-op");
    }

    #[tokio::test]
    async fn emptied_topic_still_accepts_notify() {
        let broker = Broker::new();
        let sub = broker.subscribe("transient").expect("subscribe");
        broker.unsubscribe("transient", sub.id());

        // The topic entry survives with zero subscribers; notify is Ok.
        broker
            .notify("transient", StateEvent::new("x", JobState::Running))
            .expect("emptied topic tolerated");
    }

    #[tokio::test]
    async fn unsubscribe_closes_channel_and_is_idempotent() {
        let broker = Broker::new();
        let mut sub = broker.subscribe("teardown").expect("subscribe");
        let keeper = broker.subscribe("teardown").expect("subscribe");

        broker.unsubscribe("teardown", sub.id());
        assert_eq!(broker.subscriber_count("teardown"), 1);
        assert!(sub.recv().await.is_none(), "channel must be closed");

        // Double unsubscribe and unknown-topic unsubscribe are no-ops.
        broker.unsubscribe("teardown", sub.id());
        broker.unsubscribe("never-registered", 42);
        assert_eq!(broker.subscriber_count("teardown"), 1);
        drop(keeper);
    }
}

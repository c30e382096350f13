//! Subscription handle owned by a watch loop.

use tokio::sync::mpsc;

use super::state::StateEvent;

/// Identifier of a subscriber, unique within its topic at any instant.
///
/// Ids are drawn randomly on subscribe and may be reused after the holder
/// unsubscribes; they are never unique across topics.
pub type SubscriberId = u32;

/// Receive half of a topic registration.
///
/// The broker keeps the send half in its registry; the watch loop owns this
/// handle and is responsible for unsubscribing exactly once on every exit
/// path. [`Subscription::recv`] returns `None` once the broker has dropped
/// the send half (unsubscribe or stale-topic cleanup) and the buffer drained.
pub struct Subscription {
    pub(crate) id: SubscriberId,
    pub(crate) topic: String,
    pub(crate) rx: mpsc::Receiver<StateEvent>,
}

impl Subscription {
    /// Id of this registration within its topic.
    #[inline]
    pub fn id(&self) -> SubscriberId {
        self.id
    }

    /// Topic this registration listens on.
    #[inline]
    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Receives the next state event, or `None` when the channel is closed.
    pub async fn recv(&mut self) -> Option<StateEvent> {
        self.rx.recv().await
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("topic", &self.topic)
            .finish_non_exhaustive()
    }
}

//! Error types for the broker and subscription registry.
//!
//! Every variant here is recoverable: callers log and continue. Nothing in
//! this crate terminates the broker or the process on error.

use thiserror::Error;

/// # Errors produced by the broker registry.
///
/// - [`BrokerError::UnknownTopic`] is expected during controller restarts,
///   when stale job watchers still emit events for topics nobody subscribed
///   to in this process. Callers should log it and keep going.
/// - [`BrokerError::RegistrationExhausted`] means the bounded random-id
///   allocation could not find a free subscriber id. With a `u32` id space
///   this is an internal fault, not something normal operation produces.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BrokerError {
    /// Notify was called for a non-empty topic with no registry entry.
    #[error("{topic} is not a registered topic")]
    UnknownTopic {
        /// The topic name the notifier used.
        topic: String,
    },

    /// Subscriber-id allocation ran out of retries for this topic.
    #[error("could not register a subscriber for topic {topic}: id space exhausted")]
    RegistrationExhausted {
        /// The topic the subscribe call targeted.
        topic: String,
    },
}

impl BrokerError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            BrokerError::UnknownTopic { .. } => "unknown_topic",
            BrokerError::RegistrationExhausted { .. } => "registration_exhausted",
        }
    }
}

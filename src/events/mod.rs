//! Job-state events: data model, broker, and subscription handle.
//!
//! This module groups the event **data model** and the **broker** used to
//! publish/subscribe to state transitions of tracked cluster jobs.
//!
//! ## Contents
//! - [`JobState`], [`StateEvent`] — state classification and payload
//! - [`Broker`] — topic → subscriber registry with fan-out notify
//! - [`Subscription`], [`SubscriberId`] — the receive half handed to a watch loop
//!
//! ## Quick reference
//! - **Publisher**: the cluster job watcher translating job status into
//!   [`StateEvent`]s via [`Broker::notify`].
//! - **Consumers**: one watch loop per [`Subscription`]
//!   (see [`watch`](crate::watch)).

mod broker;
mod state;
mod subscription;

pub use broker::Broker;
pub use state::{JobState, StateEvent};
pub use subscription::{SubscriberId, Subscription};

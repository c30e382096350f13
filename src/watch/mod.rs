//! Per-job watch loop and its wiring.
//!
//! One watch loop runs per [`Subscription`](crate::Subscription): it consumes
//! state events, applies the job lifecycle state machine, fires the caller's
//! hooks, drives the [`Locker`](crate::Locker) and the outcome counters, and
//! unsubscribes itself on exit.
//!
//! ## Contents
//! - [`WatchContext`], [`StateHook`] — per-job wiring handed in by the event
//!   source when it starts watching a cluster job
//! - [`watch`] — the loop itself

mod context;
mod watcher;

pub use context::{StateHook, WatchContext};
pub use watcher::watch;

//! Combinators deriving new observables.
//!
//! Every derived observable owns its own listener registry and is connected
//! to its source(s) only while it has at least one listener. Per-connection
//! state (a `skip` counter, a `buffer` window, the latest `zip` pair) starts
//! fresh on every reconnect.
//!
//! The time-based operators (`delayed`, `once_every`, `time_buffer`,
//! `within_timeframe`) read time from an injected [`TimeContext`].
//!
//! [`TimeContext`]: crate::scheduler::TimeContext

use std::{cell::Cell, rc::Rc};

use crate::observable::Sink;

pub mod buffer;
pub mod changes;
pub mod collect;
pub mod delayed;
pub mod filter;
pub mod flat_map;
pub mod into_stream;
pub mod join;
pub mod map;
pub mod once_every;
pub mod skip;
pub mod time_buffer;
pub mod to_future;
pub mod zip;

/// A finish callback that finishes `sink` once it has been called for every
/// one of the `remaining` sources.
pub(crate) fn countdown<B: Clone + 'static>(
  remaining: &Rc<Cell<usize>>,
  sink: &Sink<B>,
) -> impl FnOnce() + 'static {
  let (remaining, sink) = (remaining.clone(), sink.clone());
  move || {
    let left = remaining.get().saturating_sub(1);
    remaining.set(left);
    if left == 0 {
      sink.finish();
    }
  }
}

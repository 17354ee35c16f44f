//! Abstract clock used by the time-based combinators.
//!
//! The host application owns the frame loop and implements [`TimeContext`] on
//! top of it; nothing in this crate reads wall time. Tests drive
//! [`TestTimeContext`] by hand.

use std::{rc::Rc, time::Duration};

use crate::subscription::Subscription;

mod test_time_context;
pub use test_time_context::TestTimeContext;

pub trait TimeContext {
  /// Time elapsed since the clock's origin.
  fn now(&self) -> Duration;

  /// Runs `task` once `delay` has elapsed. Unsubscribing the returned handle
  /// before that cancels the task.
  fn after(&self, delay: Duration, task: Box<dyn FnOnce()>) -> Subscription;
}

impl<T: TimeContext + ?Sized> TimeContext for Rc<T> {
  #[inline]
  fn now(&self) -> Duration { (**self).now() }

  #[inline]
  fn after(&self, delay: Duration, task: Box<dyn FnOnce()>) -> Subscription {
    (**self).after(delay, task)
  }
}

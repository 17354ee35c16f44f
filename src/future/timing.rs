use std::time::Duration;

use super::{Future, FutureKind};
use crate::{error::Failure, scheduler::TimeContext, subscription::Subscription};

impl<A: Clone + 'static> Future<A> {
  /// A future that completes with `value` once `delay` has elapsed on
  /// `clock`.
  pub fn after<C: TimeContext>(delay: Duration, clock: &C, value: A) -> Self {
    Future::from_fn(|promise| {
      clock.after(delay, Box::new(move || promise.complete_success(value)));
    })
  }

  /// Completes with this future's outcome, `duration` after it arrives.
  pub fn delay<C: TimeContext + Clone + 'static>(&self, duration: Duration, clock: &C) -> Self {
    if self.kind() == FutureKind::Unfulfilled {
      return self.clone();
    }
    let clock = clock.clone();
    Future::from_fn(|promise| {
      self.on_complete(move |outcome| {
        clock.after(duration, Box::new(move || promise.complete(outcome)));
      });
    })
  }

  /// Fails with [`Failure::TimedOut`] unless this future completes within
  /// `duration`. Whichever side loses is cancelled.
  pub fn timeout<C: TimeContext>(&self, duration: Duration, clock: &C) -> Self {
    if self.is_completed() {
      return self.clone();
    }
    Future::from_fn(|promise| {
      let source = Subscription::composite();
      let timer = {
        let (promise, source) = (promise.clone(), source.clone());
        clock.after(
          duration,
          Box::new(move || {
            source.unsubscribe();
            promise.try_complete(Err(Failure::TimedOut(duration)));
          }),
        )
      };
      source.add(self.on_complete(move |outcome| {
        if promise.try_complete(outcome) {
          timer.unsubscribe();
        }
      }));
    })
  }
}

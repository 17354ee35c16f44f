use std::time::Duration;

use crate::{
  observable::{Observable, Sink},
  scheduler::TimeContext,
};

impl<A: Clone + 'static> Observable<A> {
  /// Emits a value only if at least `period` has passed on `clock` since the
  /// last value it emitted. The first value of each connection always passes.
  pub fn once_every<C: TimeContext + Clone + 'static>(
    &self,
    period: Duration,
    clock: &C,
  ) -> Observable<A> {
    let clock = clock.clone();
    self.lift(move || {
      let clock = clock.clone();
      let mut last_emit: Option<Duration> = None;
      move |a: A, sink: &Sink<A>| {
        let now = clock.now();
        if last_emit.is_some_and(|last| last + period > now) {
          return;
        }
        last_emit = Some(now);
        sink.push(a)
      }
    })
  }
}

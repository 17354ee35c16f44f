use std::{collections::VecDeque, time::Duration};

use crate::{
  observable::{Observable, Sink},
  scheduler::TimeContext,
};

impl<A: Clone + 'static> Observable<A> {
  /// Buffers `(value, arrival time)` pairs spanning `span` of `clock` time,
  /// oldest first.
  ///
  /// Nothing is emitted until the buffer covers at least `span`. From then
  /// on every value emits the buffer after dropping the entries older than
  /// `span` relative to the newest one.
  pub fn time_buffer<C: TimeContext + Clone + 'static>(
    &self,
    span: Duration,
    clock: &C,
  ) -> Observable<Vec<(A, Duration)>> {
    let clock = clock.clone();
    self.lift(move || {
      let clock = clock.clone();
      let mut window: VecDeque<(A, Duration)> = VecDeque::new();
      move |a: A, sink: &Sink<Vec<(A, Duration)>>| {
        let now = clock.now();
        window.push_back((a, now));
        let oldest = window.front().map_or(now, |(_, t)| *t);
        if oldest + span > now {
          return;
        }
        while window.front().is_some_and(|(_, t)| *t + span < now) {
          window.pop_front();
        }
        sink.push(window.iter().cloned().collect())
      }
    })
  }

  /// Emits the last `count` `(value, arrival time)` pairs whenever all of
  /// them arrived within `timeframe` of each other on `clock`.
  ///
  /// # Panics
  ///
  /// When `count` is zero.
  #[track_caller]
  pub fn within_timeframe<C: TimeContext + Clone + 'static>(
    &self,
    count: usize,
    timeframe: Duration,
    clock: &C,
  ) -> Observable<Vec<(A, Duration)>> {
    let clock = clock.clone();
    self
      .map(move |a: A| (a, clock.now()))
      .buffer(count)
      .filter(move |events: &Vec<(A, Duration)>| match (events.first(), events.last()) {
        (Some((_, first)), Some((_, last))) => {
          events.len() == count && *last - *first <= timeframe
        }
        _ => false,
      })
  }
}

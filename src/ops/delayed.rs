use std::{rc::Rc, time::Duration};

use crate::{
  observable::{Observable, Sink},
  scheduler::TimeContext,
  subscription::{Subscription, SubscriptionTracker},
};

impl<A: Clone + 'static> Observable<A> {
  /// Re-emits every value `delay` after it arrives, as measured by `clock`.
  ///
  /// The finish is delayed the same way, so it follows the values emitted
  /// before it. Timers still pending when the last listener leaves are
  /// cancelled.
  pub fn delayed<C: TimeContext + Clone + 'static>(
    &self,
    delay: Duration,
    clock: &C,
  ) -> Observable<A> {
    let (source, clock) = (self.clone(), clock.clone());
    Observable::create(move |sink: Sink<A>| {
      let timers = Rc::new(SubscriptionTracker::new());
      let link = Subscription::composite();
      let on_event = {
        let (clock, sink, timers) = (clock.clone(), sink.clone(), timers.clone());
        move |a: A| {
          let sink = sink.clone();
          schedule(&clock, delay, &timers, move || sink.push(a));
        }
      };
      let on_finish = {
        let (clock, timers) = (clock.clone(), timers.clone());
        let finisher = sink.clone();
        move || schedule(&clock, delay, &timers, move || finisher.finish())
      };
      link.add(source.subscribe_with(on_event, on_finish));
      link.add_teardown(move || timers.unsubscribe_all());
      link
    })
  }
}

/// Runs `task` after `delay`, tracked in `timers` until it fires.
fn schedule<C: TimeContext>(
  clock: &C,
  delay: Duration,
  timers: &SubscriptionTracker,
  task: impl FnOnce() + 'static,
) {
  let timer = Subscription::composite();
  let spent = timer.clone();
  timer.add(clock.after(
    delay,
    Box::new(move || {
      spent.close();
      task();
    }),
  ));
  timers.track(timer);
}

#[cfg(test)]
mod tests {
  use std::{cell::RefCell, rc::Rc, time::Duration};

  use crate::prelude::*;

  fn ms(v: u64) -> Duration { Duration::from_millis(v) }

  #[rxcore_macro::test]
  fn values_arrive_after_the_delay() {
    let clock = TestTimeContext::new();
    let subject = Subject::<i32>::new();
    let seen = Rc::new(RefCell::new(vec![]));
    let c_seen = seen.clone();
    let c_clock = clock.clone();
    let _sub = subject
      .delayed(ms(100), &clock)
      .subscribe(move |v| c_seen.borrow_mut().push((v, c_clock.now())));

    subject.push(1);
    clock.advance_by(ms(40));
    subject.push(2);
    clock.advance_by(ms(59));
    assert!(seen.borrow().is_empty());

    clock.advance_by(ms(1));
    assert_eq!(*seen.borrow(), [(1, ms(100))]);
    clock.advance_by(ms(40));
    assert_eq!(*seen.borrow(), [(1, ms(100)), (2, ms(140))]);
    assert_eq!(clock.pending_count(), 0);
  }

  #[rxcore_macro::test]
  fn finish_follows_delayed_values() {
    let clock = TestTimeContext::new();
    let subject = Subject::<i32>::new();
    let log = Rc::new(RefCell::new(vec![]));
    let (on_value, on_finish) = (log.clone(), log.clone());
    let delayed = subject.delayed(ms(10), &clock);
    let _sub = delayed.subscribe_with(
      move |v| on_value.borrow_mut().push(format!("value {v}")),
      move || on_finish.borrow_mut().push("finish".to_string()),
    );

    subject.push(7);
    subject.finish();
    assert!(log.borrow().is_empty());
    assert!(!delayed.is_finished());

    clock.advance_by(ms(10));
    assert_eq!(*log.borrow(), ["value 7", "finish"]);
    assert!(delayed.is_finished());
  }

  #[rxcore_macro::test]
  fn unsubscribing_cancels_pending_timers() {
    let clock = TestTimeContext::new();
    let subject = Subject::<i32>::new();
    let seen = Rc::new(RefCell::new(vec![]));
    let c_seen = seen.clone();
    let sub = subject.delayed(ms(10), &clock).subscribe(move |v| c_seen.borrow_mut().push(v));

    subject.push(1);
    subject.push(2);
    assert_eq!(clock.pending_count(), 2);

    sub.unsubscribe();
    assert_eq!(clock.pending_count(), 0);
    assert_eq!(subject.subscribers(), 0);
    clock.flush();
    assert!(seen.borrow().is_empty());
  }
}

//! Hot sources: [`Subject`] and [`ReplaySubject`].
//!
//! A subject is the write side of an [`Observable`]; it dereferences to the
//! observable so every combinator is available on it directly.

use std::ops::Deref;

use crate::{error::RxError, observable::Observable};

mod replay_subject;
pub use replay_subject::ReplaySubject;

pub struct Subject<A> {
  observable: Observable<A>,
}

impl<A> Clone for Subject<A> {
  fn clone(&self) -> Self { Subject { observable: self.observable.clone() } }
}

impl<A: Clone + 'static> Default for Subject<A> {
  fn default() -> Self { Self::new() }
}

impl<A: Clone + 'static> Subject<A> {
  pub fn new() -> Self {
    Subject { observable: Observable(crate::observable::dispatch::Core::new(false, None)) }
  }

  /// Delivers `value` to every listener, after any values already queued by
  /// a running dispatch.
  ///
  /// # Panics
  ///
  /// When the subject is finished or finishing.
  #[track_caller]
  pub fn push(&self, value: A) {
    if let Err(err) = self.try_push(value) {
      panic!("{err}");
    }
  }

  pub fn try_push(&self, value: A) -> Result<(), RxError> {
    if self.observable.0.is_finishing() {
      return Err(RxError::Finished);
    }
    self.observable.0.push(value);
    Ok(())
  }

  /// Notifies and unsubscribes every listener. Called during a dispatch, it
  /// takes effect once the queued values are delivered. Finishing twice is a
  /// no-op.
  pub fn finish(&self) { self.observable.0.finish() }

  /// A read-only handle sharing this subject's listeners.
  pub fn observable(&self) -> Observable<A> { self.observable.clone() }
}

impl<A> Deref for Subject<A> {
  type Target = Observable<A>;

  fn deref(&self) -> &Self::Target { &self.observable }
}

#[cfg(test)]
mod tests {
  use std::{
    cell::{Cell, RefCell},
    rc::Rc,
  };

  use crate::prelude::*;

  type Log = Rc<RefCell<Vec<(i32, &'static str)>>>;

  #[rxcore_macro::test]
  fn subscriber_counting() {
    let subject = Subject::<i32>::new();
    let f = subject.subscribe(|_| {});
    let g = subject.subscribe(|_| {});
    assert_eq!(subject.subscribers(), 2);

    f.unsubscribe();
    f.unsubscribe();
    assert_eq!(subject.subscribers(), 1);
    g.unsubscribe();
    assert_eq!(subject.subscribers(), 0);
  }

  #[rxcore_macro::test]
  fn reentrant_push_is_breadth_first() {
    let subject = Subject::<i32>::new();
    let log: Log = Rc::default();
    {
      let (subject_in, log) = (subject.clone(), log.clone());
      subject.subscribe(move |v| {
        log.borrow_mut().push((v, "A"));
        if v == 0 {
          subject_in.push(1);
          subject_in.push(2);
        }
      });
    }
    {
      let log = log.clone();
      subject.subscribe(move |v| log.borrow_mut().push((v, "B")));
    }

    subject.push(0);
    assert_eq!(*log.borrow(), [(0, "A"), (0, "B"), (1, "A"), (1, "B"), (2, "A"), (2, "B")]);
  }

  #[rxcore_macro::test]
  fn reentrant_subscribe_is_deferred() {
    let subject = Subject::<i32>::new();
    let late_seen = Rc::new(RefCell::new(vec![]));
    let counts = Rc::new(RefCell::new(vec![]));
    let late: Rc<RefCell<Option<Subscription>>> = Rc::default();
    {
      let (subject_in, late_seen, counts, late) =
        (subject.clone(), late_seen.clone(), counts.clone(), late.clone());
      subject.subscribe(move |v| {
        if v == 0 {
          let late_seen = late_seen.clone();
          let sub = subject_in.subscribe(move |v| late_seen.borrow_mut().push(v));
          *late.borrow_mut() = Some(sub);
        }
        counts.borrow_mut().push(subject_in.subscribers());
      });
    }

    subject.push(0);
    assert!(late_seen.borrow().is_empty());
    assert_eq!(subject.subscribers(), 2);

    subject.push(1);
    assert_eq!(*late_seen.borrow(), [1]);
    assert_eq!(*counts.borrow(), [1, 2]);
  }

  #[rxcore_macro::test]
  fn subscribed_mid_round_receives_queued_values() {
    let subject = Subject::<i32>::new();
    let late_seen = Rc::new(RefCell::new(vec![]));
    {
      let (subject_in, late_seen) = (subject.clone(), late_seen.clone());
      subject.subscribe(move |v| {
        if v == 0 {
          subject_in.push(1);
          let late_seen = late_seen.clone();
          subject_in.subscribe(move |v| late_seen.borrow_mut().push(v));
        }
      });
    }

    subject.push(0);
    assert_eq!(*late_seen.borrow(), [1]);
  }

  #[rxcore_macro::test]
  fn unsubscribe_from_listener_stops_remaining() {
    let subject = Subject::<i32>::new();
    let log: Log = Rc::default();
    let victim: Rc<RefCell<Option<Subscription>>> = Rc::default();
    {
      let (log, victim) = (log.clone(), victim.clone());
      subject.subscribe(move |v| {
        log.borrow_mut().push((v, "A"));
        if let Some(victim) = victim.borrow().as_ref() {
          victim.unsubscribe();
        }
      });
    }
    {
      let log = log.clone();
      *victim.borrow_mut() = Some(subject.subscribe(move |v| log.borrow_mut().push((v, "B"))));
    }

    subject.push(0);
    assert_eq!(*log.borrow(), [(0, "A")]);
  }

  #[rxcore_macro::test]
  fn finish_notifies_and_unsubscribes() {
    let subject = Subject::<i32>::new();
    let finished = Rc::new(Cell::new(0));
    let c_finished = finished.clone();
    let sub = subject.subscribe_with(|_| {}, move || c_finished.set(c_finished.get() + 1));

    subject.finish();
    subject.finish();
    assert_eq!(finished.get(), 1);
    assert!(sub.is_closed());
    assert!(subject.is_finished());
    assert_eq!(subject.try_push(1), Err(RxError::Finished));
    assert!(subject.subscribe(|_| {}).is_closed());
  }

  #[rxcore_macro::test]
  #[should_panic(expected = "observable is already finished")]
  fn push_after_finish_panics() {
    let subject = Subject::new();
    subject.finish();
    subject.push(1);
  }

  #[rxcore_macro::test]
  fn push_during_pending_finish_is_rejected() {
    let subject = Subject::<i32>::new();
    let rejected = Rc::new(Cell::new(None));
    {
      let (subject_in, rejected) = (subject.clone(), rejected.clone());
      subject.subscribe(move |_| {
        subject_in.finish();
        rejected.set(Some(subject_in.try_push(5)));
      });
    }

    subject.push(0);
    assert_eq!(rejected.get(), Some(Err(RxError::Finished)));
    assert!(subject.is_finished());
  }
}

use std::ops::Deref;

use super::Subject;
use crate::{
  error::RxError,
  observable::{dispatch::Core, Observable},
};

/// A [`Subject`] that records every value it dispatches and replays the
/// record, in order, to each new listener before live values.
///
/// Replay keeps working after [`ReplaySubject::finish`]: a late listener gets
/// the full history and an already closed subscription.
pub struct ReplaySubject<A> {
  subject: Subject<A>,
}

impl<A> Clone for ReplaySubject<A> {
  fn clone(&self) -> Self { ReplaySubject { subject: self.subject.clone() } }
}

impl<A: Clone + 'static> Default for ReplaySubject<A> {
  fn default() -> Self { Self::new() }
}

impl<A: Clone + 'static> ReplaySubject<A> {
  pub fn new() -> Self {
    ReplaySubject { subject: Subject { observable: Observable(Core::new(true, None)) } }
  }

  #[track_caller]
  pub fn push(&self, value: A) { self.subject.push(value) }

  pub fn try_push(&self, value: A) -> Result<(), RxError> { self.subject.try_push(value) }

  pub fn finish(&self) { self.subject.finish() }

  /// Forgets the recorded history. Current listeners are unaffected.
  pub fn clear(&self) { self.subject.observable.0.clear_history() }

  pub fn observable(&self) -> Observable<A> { self.subject.observable() }
}

impl<A> Deref for ReplaySubject<A> {
  type Target = Observable<A>;

  fn deref(&self) -> &Self::Target { &self.subject }
}

#[cfg(test)]
mod tests {
  use std::{cell::RefCell, rc::Rc};

  use crate::prelude::*;

  fn collect(source: &Observable<i32>) -> (Rc<RefCell<Vec<i32>>>, Subscription) {
    let seen = Rc::new(RefCell::new(vec![]));
    let c_seen = seen.clone();
    let sub = source.subscribe(move |v| c_seen.borrow_mut().push(v));
    (seen, sub)
  }

  #[rxcore_macro::test]
  fn late_subscriber_gets_history_then_live() {
    let subject = ReplaySubject::<i32>::new();
    subject.push(1);
    subject.push(2);

    let (seen, _sub) = collect(&subject);
    assert_eq!(*seen.borrow(), [1, 2]);
    subject.push(3);
    assert_eq!(*seen.borrow(), [1, 2, 3]);
  }

  #[rxcore_macro::test]
  fn replays_after_finish() {
    let subject = ReplaySubject::<i32>::new();
    subject.push(1);
    subject.finish();

    let (seen, sub) = collect(&subject);
    assert_eq!(*seen.borrow(), [1]);
    assert!(sub.is_closed());
  }

  #[rxcore_macro::test]
  fn clear_resets_history_only() {
    let subject = ReplaySubject::<i32>::new();
    subject.push(1);
    let (early, _early_sub) = collect(&subject);

    subject.clear();
    subject.push(2);
    let (late, _late_sub) = collect(&subject);

    assert_eq!(*early.borrow(), [1, 2]);
    assert_eq!(*late.borrow(), [2]);
    assert_eq!(subject.subscribers(), 2);
  }

  #[rxcore_macro::test]
  fn subscribe_during_dispatch_sees_no_duplicates() {
    let subject = ReplaySubject::<i32>::new();
    let late: Rc<RefCell<Option<Rc<RefCell<Vec<i32>>>>>> = Rc::default();
    {
      let (subject_in, late) = (subject.clone(), late.clone());
      subject.subscribe(move |v| {
        if v == 1 {
          subject_in.push(2);
          let (seen, _sub) = collect(&subject_in);
          *late.borrow_mut() = Some(seen);
        }
      });
    }

    subject.push(1);
    let late = late.borrow().clone().unwrap();
    assert_eq!(*late.borrow(), [1, 2]);
  }
}

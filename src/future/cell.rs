use std::{
  cell::{Ref, RefCell},
  panic::{self, AssertUnwindSafe},
  rc::Rc,
};

use smallvec::SmallVec;

use super::Outcome;
use crate::subscription::Subscription;

struct Listener<A> {
  id: usize,
  handles_failure: bool,
  token: Subscription,
  callback: Box<dyn FnOnce(Outcome<A>)>,
}

struct Listeners<A> {
  next_id: usize,
  items: SmallVec<[Listener<A>; 2]>,
}

/// Write-once storage shared by a pending future and its promises.
pub(crate) struct FutureCell<A> {
  outcome: RefCell<Option<Outcome<A>>>,
  listeners: RefCell<Listeners<A>>,
}

impl<A> FutureCell<A> {
  pub(crate) fn outcome_ref(&self) -> Ref<'_, Option<Outcome<A>>> { self.outcome.borrow() }
}

impl<A: Clone + 'static> FutureCell<A> {
  pub(crate) fn new() -> Rc<Self> {
    Rc::new(FutureCell {
      outcome: RefCell::new(None),
      listeners: RefCell::new(Listeners { next_id: 0, items: SmallVec::new() }),
    })
  }

  pub(crate) fn value(&self) -> Option<Outcome<A>> { self.outcome.borrow().clone() }

  pub(crate) fn is_completed(&self) -> bool { self.outcome.borrow().is_some() }

  /// Sets the outcome and hands it to every listener registered so far.
  /// Returns `false`, touching nothing, when the cell is already set.
  pub(crate) fn try_complete(&self, outcome: Outcome<A>) -> bool {
    {
      let mut slot = self.outcome.borrow_mut();
      if slot.is_some() {
        return false;
      }
      *slot = Some(outcome.clone());
    }

    let listeners = std::mem::take(&mut self.listeners.borrow_mut().items);
    if let Err(failure) = &outcome {
      if !listeners.iter().any(|l| l.handles_failure) {
        report_unhandled(failure);
      }
    }

    // Every listener runs even if an earlier one panics; the first panic
    // resumes once all of them have been called.
    let mut first_panic = None;
    for Listener { token, callback, .. } in listeners {
      token.close();
      let outcome = outcome.clone();
      if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(move || callback(outcome))) {
        first_panic.get_or_insert(payload);
      }
    }
    if let Some(payload) = first_panic {
      panic::resume_unwind(payload);
    }
    true
  }

  /// Runs `callback` inline when the cell is already set, otherwise queues
  /// it. `handles_failure` marks the listener as error-aware.
  pub(crate) fn subscribe(
    self: &Rc<Self>,
    handles_failure: bool,
    callback: Box<dyn FnOnce(Outcome<A>)>,
  ) -> Subscription {
    if let Some(outcome) = self.value() {
      callback(outcome);
      return Subscription::empty();
    }

    let mut listeners = self.listeners.borrow_mut();
    let id = listeners.next_id;
    listeners.next_id += 1;
    let cell = Rc::downgrade(self);
    let token = Subscription::new(move || {
      if let Some(cell) = cell.upgrade() {
        cell.remove(id);
      }
    });
    listeners.items.push(Listener { id, handles_failure, token: token.clone(), callback });
    token
  }

  fn remove(&self, id: usize) {
    let removed = {
      let mut listeners = self.listeners.borrow_mut();
      let pos = listeners.items.iter().position(|l| l.id == id);
      pos.map(|pos| listeners.items.remove(pos))
    };
    drop(removed);
  }

  #[cfg(test)]
  pub(crate) fn listener_count(&self) -> usize { self.listeners.borrow().items.len() }
}

fn report_unhandled(failure: &crate::error::Failure) {
  #[cfg(feature = "tracing")]
  tracing::error!(target: "rxcore::future", %failure, "unhandled future failure");
  #[cfg(not(feature = "tracing"))]
  let _ = failure;
}

#[cfg(test)]
mod tests {
  use std::{cell::RefCell, rc::Rc};

  use super::*;
  use crate::error::Failure;

  #[rxcore_macro::test]
  fn listeners_fire_in_registration_order() {
    let cell = FutureCell::<i32>::new();
    let log = Rc::new(RefCell::new(vec![]));
    for tag in ["a", "b", "c"] {
      let log = log.clone();
      cell.subscribe(false, Box::new(move |o: Outcome<i32>| log.borrow_mut().push((tag, o))));
    }

    assert!(cell.try_complete(Ok(3)));
    assert_eq!(*log.borrow(), [("a", Ok(3)), ("b", Ok(3)), ("c", Ok(3))]);
    assert_eq!(cell.listener_count(), 0);
  }

  #[rxcore_macro::test]
  fn tokens_close_after_firing() {
    let cell = FutureCell::<i32>::new();
    let token = cell.subscribe(true, Box::new(|_: Outcome<i32>| {}));
    assert!(!token.is_closed());

    cell.try_complete(Err(Failure::Abandoned));
    assert!(token.is_closed());
    token.unsubscribe();
  }

  #[rxcore_macro::test]
  fn cancelled_listener_is_dropped() {
    let cell = FutureCell::<i32>::new();
    let hit = Rc::new(RefCell::new(false));
    let c_hit = hit.clone();
    let token = cell.subscribe(false, Box::new(move |_: Outcome<i32>| *c_hit.borrow_mut() = true));
    token.unsubscribe();

    assert_eq!(cell.listener_count(), 0);
    cell.try_complete(Ok(1));
    assert!(!*hit.borrow());
  }

  #[rxcore_macro::test]
  fn panicking_listener_does_not_starve_later_ones() {
    let cell = FutureCell::<i32>::new();
    let seen = Rc::new(RefCell::new(vec![]));
    cell.subscribe(true, Box::new(|_: Outcome<i32>| panic!("first listener failed")));
    {
      let seen = seen.clone();
      cell.subscribe(false, Box::new(move |o: Outcome<i32>| seen.borrow_mut().push(o)));
    }

    let caught = panic::catch_unwind(AssertUnwindSafe(|| cell.try_complete(Ok(1))));
    assert!(caught.is_err());
    assert_eq!(cell.value(), Some(Ok(1)));
    assert_eq!(*seen.borrow(), [Ok(1)]);
    assert_eq!(cell.listener_count(), 0);
  }

  #[rxcore_macro::test]
  fn listener_may_subscribe_while_completing() {
    let cell = FutureCell::<i32>::new();
    let seen = Rc::new(RefCell::new(vec![]));
    let (c_cell, c_seen) = (cell.clone(), seen.clone());
    cell.subscribe(
      false,
      Box::new(move |first: Outcome<i32>| {
        let seen = c_seen.clone();
        c_seen.borrow_mut().push(first);
        c_cell.subscribe(
          false,
          Box::new(move |second: Outcome<i32>| seen.borrow_mut().push(second)),
        );
      }),
    );

    cell.try_complete(Ok(5));
    assert_eq!(*seen.borrow(), [Ok(5), Ok(5)]);
  }
}

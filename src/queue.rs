//! Bounded concurrency for asynchronous operations.
//!
//! ```rust
//! use std::{cell::RefCell, rc::Rc};
//!
//! use rxcore::prelude::*;
//!
//! let promises: Rc<RefCell<Vec<Promise<u32>>>> = Rc::default();
//! let queue = {
//!   let promises = promises.clone();
//!   AsyncQueue::with_promise(2, move |_n: u32, promise| promises.borrow_mut().push(promise))
//! };
//!
//! let results: Vec<_> = (0..5).map(|n| queue.query(n)).collect();
//! assert_eq!((queue.in_flight(), queue.queued()), (2, 3));
//!
//! let first = promises.borrow()[0].clone();
//! first.complete_success(10);
//! assert_eq!(results[0].value(), Some(Ok(10)));
//! assert_eq!((queue.in_flight(), queue.queued()), (2, 2));
//! ```

use std::{
  cell::{Cell, RefCell},
  collections::VecDeque,
  panic::{self, AssertUnwindSafe},
  rc::{Rc, Weak},
};

use crate::{
  error::catch_failure,
  future::{Future, Promise},
};

type Execute<P, A> = Box<dyn Fn(P) -> Future<A>>;

/// Runs at most `max` operations at a time and queues the rest in FIFO
/// order.
pub struct AsyncQueue<P, A>(Rc<QueueState<P, A>>);

impl<P, A> Clone for AsyncQueue<P, A> {
  fn clone(&self) -> Self { AsyncQueue(self.0.clone()) }
}

struct QueueState<P, A> {
  max: usize,
  execute: Execute<P, A>,
  waiting: RefCell<VecDeque<(P, Promise<A>)>>,
  in_flight: Cell<usize>,
  pumping: Cell<bool>,
}

struct PumpGuard<'a>(&'a Cell<bool>);

impl Drop for PumpGuard<'_> {
  fn drop(&mut self) { self.0.set(false) }
}

impl<P: 'static, A: Clone + 'static> AsyncQueue<P, A> {
  /// # Panics
  ///
  /// When `max` is zero.
  #[track_caller]
  pub fn new(max: usize, execute: impl Fn(P) -> Future<A> + 'static) -> Self {
    assert!(max > 0, "queue concurrency must be positive");
    AsyncQueue(Rc::new(QueueState {
      max,
      execute: Box::new(execute),
      waiting: RefCell::default(),
      in_flight: Cell::new(0),
      pumping: Cell::new(false),
    }))
  }

  /// For callback-style operations that complete the promise they are given.
  #[track_caller]
  pub fn with_promise(max: usize, execute: impl Fn(P, Promise<A>) + 'static) -> Self {
    Self::new(max, move |p| Future::from_fn(|promise| execute(p, promise)))
  }

  /// Enqueues `params`; the operation starts right away when fewer than
  /// `max` are in flight.
  pub fn query(&self, params: P) -> Future<A> {
    let (future, promise) = Future::create();
    self.0.waiting.borrow_mut().push_back((params, promise));
    QueueState::pump(&self.0);
    future
  }

  pub fn in_flight(&self) -> usize { self.0.in_flight.get() }

  pub fn queued(&self) -> usize { self.0.waiting.borrow().len() }
}

impl<P: 'static, A: Clone + 'static> QueueState<P, A> {
  fn pump(this: &Rc<Self>) {
    if this.pumping.replace(true) {
      return;
    }
    let _guard = PumpGuard(&this.pumping);
    while this.in_flight.get() < this.max {
      let next = this.waiting.borrow_mut().pop_front();
      let Some((params, promise)) = next else { break };
      this.in_flight.set(this.in_flight.get() + 1);
      let running = catch_failure(|| (this.execute)(params)).unwrap_or_else(Future::failed);

      let state = Rc::downgrade(this);
      running.on_complete(move |outcome| {
        let delivered = panic::catch_unwind(AssertUnwindSafe(|| promise.try_complete(outcome)));
        Self::settle(&state);
        if let Err(payload) = delivered {
          panic::resume_unwind(payload);
        }
      });
    }
  }

  fn settle(state: &Weak<Self>) {
    if let Some(state) = state.upgrade() {
      state.in_flight.set(state.in_flight.get().saturating_sub(1));
      Self::pump(&state);
    }
  }
}

#[cfg(test)]
mod tests {
  use std::{cell::RefCell, rc::Rc};

  use crate::prelude::*;

  type Promises = Rc<RefCell<Vec<Promise<usize>>>>;

  fn manual_queue(max: usize) -> (AsyncQueue<usize, usize>, Promises) {
    let promises: Promises = Rc::default();
    let c_promises = promises.clone();
    let queue = AsyncQueue::with_promise(max, move |_: usize, promise| {
      c_promises.borrow_mut().push(promise)
    });
    (queue, promises)
  }

  #[rxcore_macro::test]
  fn at_most_max_in_flight() {
    let (queue, promises) = manual_queue(4);
    let results: Vec<_> = (0..40).map(|n| queue.query(n)).collect();
    assert_eq!(promises.borrow().len(), 4);
    assert_eq!(queue.in_flight(), 4);
    assert_eq!(queue.queued(), 36);

    let first = promises.borrow()[0].clone();
    first.complete_success(0);
    assert_eq!(promises.borrow().len(), 5);
    assert_eq!(queue.in_flight(), 4);
    assert_eq!(results[0].value(), Some(Ok(0)));
  }

  #[rxcore_macro::test]
  fn dispatches_in_fifo_order() {
    let started = Rc::new(RefCell::new(vec![]));
    let c_started = started.clone();
    let queue = AsyncQueue::new(1, move |n: usize| {
      c_started.borrow_mut().push(n);
      Future::successful(n * 2)
    });

    let results: Vec<_> = (0..5).map(|n| queue.query(n)).collect();
    assert_eq!(*started.borrow(), [0, 1, 2, 3, 4]);
    assert!(results.iter().enumerate().all(|(n, f)| f.value() == Some(Ok(n * 2))));
    assert_eq!((queue.in_flight(), queue.queued()), (0, 0));
  }

  #[rxcore_macro::test]
  fn starts_in_submission_order_with_out_of_order_completions() {
    let started = Rc::new(RefCell::new(vec![]));
    let promises: Promises = Rc::default();
    let queue = {
      let (started, promises) = (started.clone(), promises.clone());
      AsyncQueue::with_promise(3, move |n: usize, promise| {
        started.borrow_mut().push(n);
        promises.borrow_mut().push(promise);
      })
    };
    let _results: Vec<_> = (0..8).map(|n| queue.query(n)).collect();
    assert_eq!(*started.borrow(), [0, 1, 2]);

    for idx in [2, 0, 4, 1, 3] {
      let promise = promises.borrow()[idx].clone();
      promise.complete_success(idx);
    }
    assert_eq!(*started.borrow(), [0, 1, 2, 3, 4, 5, 6, 7]);
    assert_eq!(queue.in_flight(), 3);
  }

  #[rxcore_macro::test]
  fn panicking_result_listener_releases_the_slot() {
    let (queue, promises) = manual_queue(1);
    let first = queue.query(0);
    first.on_complete(|_| panic!("result listener failed"));
    let second = queue.query(1);
    assert_eq!(queue.queued(), 1);

    let first_promise = promises.borrow()[0].clone();
    let caught =
      std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| first_promise.complete_success(7)));
    assert!(caught.is_err());
    assert_eq!(first.value(), Some(Ok(7)));
    assert_eq!((queue.in_flight(), queue.queued()), (1, 0));

    let second_promise = promises.borrow()[1].clone();
    second_promise.complete_success(8);
    assert_eq!(second.value(), Some(Ok(8)));
    assert_eq!(queue.in_flight(), 0);
  }

  #[rxcore_macro::test]
  fn panicking_operation_fails_its_future() {
    let queue = AsyncQueue::new(1, |n: usize| {
      if n == 0 {
        panic!("boom");
      }
      Future::successful(n)
    });
    let failed = queue.query(0);
    let next = queue.query(1);
    assert!(matches!(failed.value(), Some(Err(Failure::Panicked(_)))));
    assert_eq!(next.value(), Some(Ok(1)));
    assert_eq!(queue.in_flight(), 0);
  }

  #[rxcore_macro::test]
  fn failures_release_the_slot() {
    let (queue, promises) = manual_queue(1);
    let first = queue.query(0);
    let _second = queue.query(1);
    let first_promise = promises.borrow()[0].clone();
    first_promise.complete_failure(Failure::message("nope"));
    assert_eq!(first.value(), Some(Err(Failure::message("nope"))));
    assert_eq!(promises.borrow().len(), 2);
  }

  #[rxcore_macro::test]
  #[should_panic(expected = "queue concurrency must be positive")]
  fn zero_max_panics() { AsyncQueue::new(0, |n: usize| Future::successful(n)); }
}

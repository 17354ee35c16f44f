//! A value that will exist at most once.
//!
//! A [`Future`] is either already completed, provably never completing
//! ([`Future::unfulfilled`]), or backed by a shared write-once cell that a
//! [`Promise`] completes. Constant futures allocate nothing.
//!
//! Listeners registered through [`Future::on_complete`] run synchronously: on
//! an already completed future before `on_complete` returns, otherwise at the
//! moment the promise is completed.
//!
//! ```rust
//! use rxcore::prelude::*;
//!
//! let (future, promise) = Future::create();
//! let doubled = future.map(|v: i32| v * 2);
//! assert_eq!(doubled.value(), None);
//!
//! promise.complete_success(21);
//! assert_eq!(doubled.value(), Some(Ok(42)));
//! ```
//!
//! A failure that reaches a pending cell whose listeners are all
//! success-only is reported through `tracing` at completion time.

use std::{
  fmt::{Debug, Formatter},
  rc::Rc,
};

use crate::{error::Failure, subscription::Subscription};

mod cell;
mod collection;
mod combinators;
mod into_future;
mod promise;
mod timing;

use cell::FutureCell;
pub use into_future::OutcomeFuture;
pub use promise::Promise;

pub type Outcome<A> = Result<A, Failure>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FutureKind {
  Completed,
  Unfulfilled,
  Pending,
}

pub struct Future<A>(Repr<A>);

enum Repr<A> {
  Completed(Outcome<A>),
  Unfulfilled,
  Pending(Rc<FutureCell<A>>),
}

impl<A: Clone> Clone for Future<A> {
  fn clone(&self) -> Self {
    Future(match &self.0 {
      Repr::Completed(outcome) => Repr::Completed(outcome.clone()),
      Repr::Unfulfilled => Repr::Unfulfilled,
      Repr::Pending(cell) => Repr::Pending(cell.clone()),
    })
  }
}

impl<A: Clone + 'static> Future<A> {
  /// A pending future and the promise that completes it.
  pub fn create() -> (Self, Promise<A>) {
    let cell = FutureCell::new();
    (Future(Repr::Pending(cell.clone())), Promise(cell))
  }

  /// Creates a pending future and hands its promise to `body`.
  pub fn from_fn(body: impl FnOnce(Promise<A>)) -> Self {
    let (future, promise) = Self::create();
    body(promise);
    future
  }

  pub fn successful(value: A) -> Self { Future(Repr::Completed(Ok(value))) }

  pub fn failed(failure: Failure) -> Self { Future(Repr::Completed(Err(failure))) }

  pub fn completed(outcome: Outcome<A>) -> Self { Future(Repr::Completed(outcome)) }

  pub fn unfulfilled() -> Self { Future(Repr::Unfulfilled) }

  pub fn kind(&self) -> FutureKind {
    match &self.0 {
      Repr::Completed(_) => FutureKind::Completed,
      Repr::Unfulfilled => FutureKind::Unfulfilled,
      Repr::Pending(cell) if cell.is_completed() => FutureKind::Completed,
      Repr::Pending(_) => FutureKind::Pending,
    }
  }

  pub fn value(&self) -> Option<Outcome<A>> {
    match &self.0 {
      Repr::Completed(outcome) => Some(outcome.clone()),
      Repr::Unfulfilled => None,
      Repr::Pending(cell) => cell.value(),
    }
  }

  pub fn is_completed(&self) -> bool { self.kind() == FutureKind::Completed }

  /// Registers an error-aware listener for the outcome.
  ///
  /// On a completed future `f` runs before this returns and the returned
  /// subscription is already closed.
  pub fn on_complete(&self, f: impl FnOnce(Outcome<A>) + 'static) -> Subscription {
    self.listen(true, Box::new(f))
  }

  /// Runs `f` with the value if the future succeeds. Does not count as
  /// handling a failure.
  pub fn on_success(&self, f: impl FnOnce(A) + 'static) -> Subscription {
    self.listen(
      false,
      Box::new(move |outcome| {
        if let Ok(value) = outcome {
          f(value)
        }
      }),
    )
  }

  pub fn on_failure(&self, f: impl FnOnce(Failure) + 'static) -> Subscription {
    self.listen(
      true,
      Box::new(move |outcome| {
        if let Err(failure) = outcome {
          f(failure)
        }
      }),
    )
  }

  pub(crate) fn listen(
    &self,
    handles_failure: bool,
    f: Box<dyn FnOnce(Outcome<A>)>,
  ) -> Subscription {
    match &self.0 {
      Repr::Completed(outcome) => {
        f(outcome.clone());
        Subscription::empty()
      }
      Repr::Unfulfilled => Subscription::empty(),
      Repr::Pending(cell) => cell.subscribe(handles_failure, f),
    }
  }

  /// Forwards this future's outcome into `promise`.
  pub(crate) fn pipe_to(&self, promise: Promise<A>) -> Subscription {
    self.on_complete(move |outcome| {
      promise.try_complete(outcome);
    })
  }
}

impl<A: Debug> Debug for Future<A> {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    match &self.0 {
      Repr::Completed(outcome) => f.debug_tuple("Future::Completed").field(outcome).finish(),
      Repr::Unfulfilled => f.write_str("Future::Unfulfilled"),
      Repr::Pending(cell) => match &*cell.outcome_ref() {
        Some(outcome) => f.debug_tuple("Future::Completed").field(outcome).finish(),
        None => f.write_str("Future::Pending"),
      },
    }
  }
}

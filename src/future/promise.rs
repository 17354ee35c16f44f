use std::rc::Rc;

use super::{cell::FutureCell, Future, Outcome, Repr};
use crate::error::{Failure, RxError};

/// The write side of a pending [`Future`].
///
/// Clones complete the same cell, so several racing producers may each hold
/// one and use [`Promise::try_complete`].
pub struct Promise<A>(pub(crate) Rc<FutureCell<A>>);

impl<A> Clone for Promise<A> {
  fn clone(&self) -> Self { Promise(self.0.clone()) }
}

impl<A: Clone + 'static> Promise<A> {
  /// # Panics
  ///
  /// When the future is already completed.
  #[track_caller]
  pub fn complete(&self, outcome: Outcome<A>) {
    if !self.0.try_complete(outcome) {
      panic!("{}", RxError::AlreadyCompleted);
    }
  }

  /// Completes the future unless it already is. Only the first outcome is
  /// ever observed.
  pub fn try_complete(&self, outcome: Outcome<A>) -> bool { self.0.try_complete(outcome) }

  #[track_caller]
  pub fn complete_success(&self, value: A) { self.complete(Ok(value)) }

  #[track_caller]
  pub fn complete_failure(&self, failure: Failure) { self.complete(Err(failure)) }

  pub fn try_complete_success(&self, value: A) -> bool { self.try_complete(Ok(value)) }

  pub fn try_complete_failure(&self, failure: Failure) -> bool { self.try_complete(Err(failure)) }

  pub fn is_completed(&self) -> bool { self.0.is_completed() }

  pub fn future(&self) -> Future<A> { Future(Repr::Pending(self.0.clone())) }
}

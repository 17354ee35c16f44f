use std::{cell::RefCell, rc::Rc};

use super::{Future, Outcome, Promise, Repr};
use crate::error::{catch_failure, Failure};

impl<A: Clone + 'static> Future<A> {
  /// Transforms the value. A panic inside `f` fails the derived future.
  pub fn map<B: Clone + 'static>(&self, f: impl FnOnce(A) -> B + 'static) -> Future<B> {
    self.try_map(move |a| Ok(f(a)))
  }

  pub fn try_map<B: Clone + 'static>(
    &self,
    f: impl FnOnce(A) -> Result<B, Failure> + 'static,
  ) -> Future<B> {
    let apply = move |outcome: Outcome<A>| outcome.and_then(|a| catch_failure(|| f(a))?);
    match &self.0 {
      Repr::Unfulfilled => Future::unfulfilled(),
      Repr::Completed(outcome) => Future::completed(apply(outcome.clone())),
      Repr::Pending(_) => Future::from_fn(|promise| {
        self.listen(true, Box::new(move |outcome| promise.complete(apply(outcome))));
      }),
    }
  }

  /// Chains a dependent future. Failures of either step fail the result.
  pub fn flat_map<B: Clone + 'static>(
    &self,
    f: impl FnOnce(A) -> Future<B> + 'static,
  ) -> Future<B> {
    match &self.0 {
      Repr::Unfulfilled => Future::unfulfilled(),
      Repr::Completed(Ok(a)) => {
        let a = a.clone();
        catch_failure(move || f(a)).unwrap_or_else(Future::failed)
      }
      Repr::Completed(Err(e)) => Future::failed(e.clone()),
      Repr::Pending(_) => Future::from_fn(|promise| {
        self.listen(
          true,
          Box::new(move |outcome: Outcome<A>| match outcome.and_then(|a| catch_failure(|| f(a))) {
            Ok(next) => {
              next.pipe_to(promise);
            }
            Err(e) => promise.complete(Err(e)),
          }),
        );
      }),
    }
  }

  /// Turns a failure into a value when `f` returns `Some`.
  pub fn recover(&self, f: impl FnOnce(Failure) -> Option<A> + 'static) -> Future<A> {
    self.recover_with(move |e| f(e).map(Future::successful))
  }

  /// Replaces a failure with another future when `f` returns `Some`.
  pub fn recover_with(
    &self,
    f: impl FnOnce(Failure) -> Option<Future<A>> + 'static,
  ) -> Future<A> {
    match &self.0 {
      Repr::Completed(Ok(_)) | Repr::Unfulfilled => self.clone(),
      Repr::Completed(Err(e)) => match catch_failure(|| f(e.clone())) {
        Ok(Some(next)) => next,
        Ok(None) => self.clone(),
        Err(panic) => Future::failed(panic),
      },
      Repr::Pending(_) => Future::from_fn(|promise| {
        self.listen(
          true,
          Box::new(move |outcome: Outcome<A>| match outcome {
            Ok(value) => promise.complete(Ok(value)),
            Err(e) => match catch_failure(|| f(e.clone())) {
              Ok(Some(next)) => {
                next.pipe_to(promise);
              }
              Ok(None) => promise.complete(Err(e)),
              Err(panic) => promise.complete(Err(panic)),
            },
          }),
        );
      }),
    }
  }

  /// Keeps the value only if `predicate` holds; otherwise the derived future
  /// never completes.
  pub fn filter(&self, predicate: impl FnOnce(&A) -> bool + 'static) -> Future<A> {
    self.collect(move |a| predicate(&a).then_some(a))
  }

  pub fn collect<B: Clone + 'static>(
    &self,
    f: impl FnOnce(A) -> Option<B> + 'static,
  ) -> Future<B> {
    self.flat_map(move |a| f(a).map_or_else(Future::unfulfilled, Future::successful))
  }

  /// Completes once both futures complete, or as soon as either fails.
  pub fn zip<B: Clone + 'static>(&self, other: &Future<B>) -> Future<(A, B)> {
    match (&self.0, &other.0) {
      (Repr::Completed(Err(e)), _) | (_, Repr::Completed(Err(e))) => {
        return Future::failed(e.clone());
      }
      (Repr::Completed(Ok(a)), Repr::Completed(Ok(b))) => {
        return Future::successful((a.clone(), b.clone()));
      }
      (Repr::Unfulfilled, Repr::Unfulfilled | Repr::Completed(_))
      | (Repr::Completed(_), Repr::Unfulfilled) => return Future::unfulfilled(),
      _ => {}
    }

    Future::from_fn(|promise| {
      let slots: Rc<RefCell<(Option<A>, Option<B>)>> = Rc::default();
      {
        let (slots, promise) = (slots.clone(), promise.clone());
        self.listen(
          true,
          Box::new(move |outcome: Outcome<A>| match outcome {
            Ok(a) => {
              slots.borrow_mut().0 = Some(a);
              emit_pair(&slots, &promise);
            }
            Err(e) => {
              promise.try_complete(Err(e));
            }
          }),
        );
      }
      other.listen(
        true,
        Box::new(move |outcome: Outcome<B>| match outcome {
          Ok(b) => {
            slots.borrow_mut().1 = Some(b);
            emit_pair(&slots, &promise);
          }
          Err(e) => {
            promise.try_complete(Err(e));
          }
        }),
      );
    })
  }
}

impl<A: Clone + 'static> Future<Future<A>> {
  pub fn flatten(&self) -> Future<A> { self.flat_map(|inner| inner) }
}

fn emit_pair<A: Clone + 'static, B: Clone + 'static>(
  slots: &RefCell<(Option<A>, Option<B>)>,
  promise: &Promise<(A, B)>,
) {
  let pair = match &*slots.borrow() {
    (Some(a), Some(b)) => Some((a.clone(), b.clone())),
    _ => None,
  };
  if let Some(pair) = pair {
    promise.try_complete(Ok(pair));
  }
}

use std::{
  cell::{Cell, RefCell},
  rc::Rc,
};

use super::{Future, FutureKind, Outcome};
use crate::error::catch_failure;

struct Sequence<A> {
  results: Vec<Option<A>>,
  remaining: usize,
}

impl<A: Clone + 'static> Future<A> {
  /// Collects every value in input order. The first failure observed fails
  /// the whole sequence; an empty input completes immediately.
  pub fn sequence(futures: impl IntoIterator<Item = Future<A>>) -> Future<Vec<A>> {
    let futures: Vec<_> = futures.into_iter().collect();
    if futures.is_empty() {
      return Future::successful(Vec::new());
    }

    Future::from_fn(|promise| {
      let state = Rc::new(RefCell::new(Sequence {
        results: vec![None; futures.len()],
        remaining: futures.len(),
      }));
      for (idx, future) in futures.iter().enumerate() {
        let (state, promise) = (state.clone(), promise.clone());
        future.listen(
          true,
          Box::new(move |outcome: Outcome<A>| match outcome {
            Ok(value) => {
              let done = {
                let mut state = state.borrow_mut();
                state.results[idx] = Some(value);
                state.remaining -= 1;
                (state.remaining == 0).then(|| state.results.drain(..).flatten().collect())
              };
              if let Some(values) = done {
                promise.try_complete(Ok(values));
              }
            }
            Err(e) => {
              promise.try_complete(Err(e));
            }
          }),
        );
      }
    })
  }

  /// Completes with whichever future completes first.
  pub fn first_of(futures: impl IntoIterator<Item = Future<A>>) -> Future<A> {
    let futures: Vec<_> = futures.into_iter().collect();
    if let Some(done) = futures.iter().find(|f| f.is_completed()) {
      return done.clone();
    }
    if futures.iter().all(|f| f.kind() == FutureKind::Unfulfilled) {
      return Future::unfulfilled();
    }

    Future::from_fn(|promise| {
      for future in &futures {
        future.pipe_to(promise.clone());
      }
    })
  }

  /// Completes with the first `Some` that `predicate` yields, or with `None`
  /// once every future has completed without a match. Failed futures count
  /// as no match, a panicking predicate fails the result.
  pub fn first_of_where<B: Clone + 'static>(
    futures: impl IntoIterator<Item = Future<A>>,
    predicate: impl Fn(A) -> Option<B> + 'static,
  ) -> Future<Option<B>> {
    let futures: Vec<_> = futures.into_iter().collect();
    if futures.is_empty() {
      return Future::successful(None);
    }

    let predicate = Rc::new(predicate);
    Future::from_fn(|promise| {
      let remaining = Rc::new(Cell::new(futures.len()));
      for future in &futures {
        let (promise, predicate, remaining) =
          (promise.clone(), predicate.clone(), remaining.clone());
        future.on_complete(move |outcome| {
          let found = match outcome {
            Ok(a) => catch_failure(|| predicate(a)),
            Err(_) => Ok(None),
          };
          remaining.set(remaining.get() - 1);
          match found {
            Ok(Some(b)) => {
              promise.try_complete(Ok(Some(b)));
            }
            Ok(None) if remaining.get() == 0 => {
              promise.try_complete(Ok(None));
            }
            Ok(None) => {}
            Err(panic) => {
              promise.try_complete(Err(panic));
            }
          }
        });
      }
    })
  }
}

//! Multicast, push-based sequences of values.
//!
//! An [`Observable`] is a read handle on a shared listener registry. Values
//! are produced either by a [`Subject`](crate::subject::Subject) or, for
//! derived observables, by an upstream connection that exists only while the
//! derived observable has at least one listener.
//!
//! ```rust
//! use std::{cell::RefCell, rc::Rc};
//!
//! use rxcore::prelude::*;
//!
//! let subject = Subject::new();
//! let evens = subject.filter(|v: &i32| v % 2 == 0);
//! assert_eq!(subject.subscribers(), 0);
//!
//! let seen = Rc::new(RefCell::new(vec![]));
//! let c_seen = seen.clone();
//! let sub = evens.subscribe(move |v| c_seen.borrow_mut().push(v));
//! assert_eq!(subject.subscribers(), 1);
//!
//! (0..5).for_each(|v| subject.push(v));
//! assert_eq!(*seen.borrow(), [0, 2, 4]);
//!
//! sub.unsubscribe();
//! assert_eq!(subject.subscribers(), 0);
//! ```

use std::rc::Rc;

use crate::subscription::Subscription;

pub(crate) mod dispatch;
use dispatch::Core;

pub struct Observable<A>(pub(crate) Rc<Core<A>>);

impl<A> Clone for Observable<A> {
  fn clone(&self) -> Self { Observable(self.0.clone()) }
}

impl<A: Clone + 'static> Observable<A> {
  /// An observable fed by `connect`.
  ///
  /// `connect` runs when the first listener subscribes and gets a [`Sink`]
  /// to push through. The subscription it returns is unsubscribed when the
  /// last listener leaves or the observable finishes, and `connect` runs
  /// again for the next first listener.
  pub fn create(connect: impl Fn(Sink<A>) -> Subscription + 'static) -> Self {
    Observable(Core::new(false, Some(Box::new(connect))))
  }

  pub fn subscribe(&self, on_event: impl FnMut(A) + 'static) -> Subscription {
    self.0.subscribe(Box::new(on_event), None)
  }

  /// Like [`Observable::subscribe`], also observing the finish. Subscribing
  /// to a finished observable calls `on_finish` right away and returns a
  /// closed subscription.
  pub fn subscribe_with(
    &self,
    on_event: impl FnMut(A) + 'static,
    on_finish: impl FnOnce() + 'static,
  ) -> Subscription {
    self.0.subscribe(Box::new(on_event), Some(Box::new(on_finish)))
  }

  /// Listeners that receive the next value. Listeners added by a running
  /// dispatch are not counted until its current round ends.
  pub fn subscribers(&self) -> usize { self.0.subscribers() }

  pub fn is_finished(&self) -> bool { self.0.is_finished() }

  /// Single-source derivation: `make` builds fresh per-connection state that
  /// sees each upstream value together with the downstream sink.
  pub(crate) fn lift<B, F>(&self, make: impl Fn() -> F + 'static) -> Observable<B>
  where
    B: Clone + 'static,
    F: FnMut(A, &Sink<B>) + 'static,
  {
    let source = self.clone();
    Observable::create(move |sink| {
      let mut step = make();
      let finisher = sink.clone();
      source.subscribe_with(move |a| step(a, &sink), move || finisher.finish())
    })
  }
}

/// Write handle given to the upstream of a derived observable.
pub struct Sink<A>(pub(crate) Rc<Core<A>>);

impl<A> Clone for Sink<A> {
  fn clone(&self) -> Self { Sink(self.0.clone()) }
}

impl<A: Clone + 'static> Sink<A> {
  /// Pushes `value` downstream. Values arriving after a finish are dropped.
  pub fn push(&self, value: A) {
    if self.0.is_finishing() {
      #[cfg(feature = "tracing")]
      tracing::trace!(target: "rxcore::observable", "dropped value pushed after finish");
      return;
    }
    self.0.push(value)
  }

  pub fn finish(&self) { self.0.finish() }

  pub fn is_finished(&self) -> bool { self.0.is_finishing() }
}

//! Change detection between consecutive values.
//!
//! `changes*` compare each value with the previous *source* value,
//! `changed_values*` with the last *emitted* one.

use std::rc::Rc;

use crate::observable::{Observable, Sink};

impl<A: Clone + 'static> Observable<A> {
  /// Emits `(previous, current)` for every value; `previous` is `None` for
  /// the first value of a connection.
  pub fn changes_opt(&self) -> Observable<(Option<A>, A)> { self.changes_opt_by(|_, _| false) }

  /// Like [`Observable::changes_opt`], skipping values `eq` considers equal
  /// to their predecessor. The first `(None, value)` pair is always emitted.
  pub fn changes_opt_by(
    &self,
    eq: impl Fn(&A, &A) -> bool + 'static,
  ) -> Observable<(Option<A>, A)> {
    let eq = Rc::new(eq);
    self.lift(move || {
      let eq = eq.clone();
      let mut last: Option<A> = None;
      move |a: A, sink: &Sink<(Option<A>, A)>| {
        let previous = last.replace(a.clone());
        if previous.as_ref().is_none_or(|prev| !eq(prev, &a)) {
          sink.push((previous, a))
        }
      }
    })
  }

  /// Emits `(previous, current)` whenever a value differs from the one
  /// before it according to `eq`.
  pub fn changes_by(&self, eq: impl Fn(&A, &A) -> bool + 'static) -> Observable<(A, A)> {
    self.changes_opt_by(eq).collect(|(prev, cur)| prev.map(|prev| (prev, cur)))
  }

  /// Emits the first value, then each value `eq` considers different from
  /// the last emitted one.
  pub fn changed_values_by(&self, eq: impl Fn(&A, &A) -> bool + 'static) -> Observable<A> {
    let eq = Rc::new(eq);
    self.lift(move || {
      let eq = eq.clone();
      let mut last: Option<A> = None;
      move |a: A, sink: &Sink<A>| {
        if last.as_ref().is_none_or(|last| !eq(last, &a)) {
          last = Some(a.clone());
          sink.push(a)
        }
      }
    })
  }
}

impl<A: Clone + PartialEq + 'static> Observable<A> {
  pub fn changes(&self) -> Observable<(A, A)> { self.changes_by(|a, b| a == b) }

  pub fn changed_values(&self) -> Observable<A> { self.changed_values_by(|a, b| a == b) }
}

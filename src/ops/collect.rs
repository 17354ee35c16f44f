use std::rc::Rc;

use crate::observable::{Observable, Sink};

impl<A: Clone + 'static> Observable<A> {
  /// Filter and map in one step: emits `b` for every value that `f` maps to
  /// `Some(b)`.
  pub fn collect<B: Clone + 'static>(&self, f: impl Fn(A) -> Option<B> + 'static) -> Observable<B> {
    let f = Rc::new(f);
    self.lift(move || {
      let f = f.clone();
      move |a: A, sink: &Sink<B>| {
        if let Some(b) = f(a) {
          sink.push(b)
        }
      }
    })
  }
}

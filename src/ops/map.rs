use std::rc::Rc;

use crate::observable::{Observable, Sink};

impl<A: Clone + 'static> Observable<A> {
  /// Emits `f(value)` for every source value.
  pub fn map<B: Clone + 'static>(&self, f: impl Fn(A) -> B + 'static) -> Observable<B> {
    let f = Rc::new(f);
    self.lift(move || {
      let f = f.clone();
      move |a: A, sink: &Sink<B>| sink.push(f(a))
    })
  }
}

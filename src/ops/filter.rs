use std::rc::Rc;

use crate::observable::{Observable, Sink};

impl<A: Clone + 'static> Observable<A> {
  /// Emits only the values `predicate` accepts.
  pub fn filter(&self, predicate: impl Fn(&A) -> bool + 'static) -> Observable<A> {
    let predicate = Rc::new(predicate);
    self.lift(move || {
      let predicate = predicate.clone();
      move |a: A, sink: &Sink<A>| {
        if predicate(&a) {
          sink.push(a)
        }
      }
    })
  }
}

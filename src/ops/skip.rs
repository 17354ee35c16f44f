use crate::observable::{Observable, Sink};

impl<A: Clone + 'static> Observable<A> {
  /// Ignores the first `count` values of each connection, then emits the
  /// rest.
  pub fn skip(&self, count: usize) -> Observable<A> {
    self.lift(move || {
      let mut remaining = count;
      move |a: A, sink: &Sink<A>| {
        if remaining > 0 {
          remaining -= 1;
        } else {
          sink.push(a)
        }
      }
    })
  }
}

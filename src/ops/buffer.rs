use std::collections::VecDeque;

use crate::observable::{Observable, Sink};

impl<A: Clone + 'static> Observable<A> {
  /// Emits the last `size` values as a `Vec` on every push. The window grows
  /// until it holds `size` values, then slides.
  ///
  /// # Panics
  ///
  /// When `size` is zero.
  #[track_caller]
  pub fn buffer(&self, size: usize) -> Observable<Vec<A>> {
    assert!(size > 0, "buffer size must be positive");
    self.lift(move || {
      let mut window = VecDeque::with_capacity(size);
      move |a: A, sink: &Sink<Vec<A>>| {
        if window.len() == size {
          window.pop_front();
        }
        window.push_back(a);
        sink.push(window.iter().cloned().collect())
      }
    })
  }
}

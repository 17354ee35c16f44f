use crate::{
  error::Failure,
  future::Future,
  observable::Observable,
  subscription::Subscription,
};

impl<A: Clone + 'static> Observable<A> {
  /// A future of the next value, unsubscribing as soon as it arrives. Fails
  /// with [`Failure::Abandoned`] when the observable finishes first.
  pub fn to_future(&self) -> Future<A> {
    let (future, promise) = Future::create();
    let link = Subscription::composite();
    let on_event = {
      let (promise, link) = (promise.clone(), link.clone());
      move |a: A| {
        promise.try_complete_success(a);
        link.unsubscribe();
      }
    };
    let on_finish = move || {
      promise.try_complete_failure(Failure::Abandoned);
    };
    link.add(self.subscribe_with(on_event, on_finish));
    future
  }
}

#[cfg(test)]
mod tests {
  use crate::prelude::*;

  #[rxcore_macro::test]
  fn completes_with_first_value() {
    let subject = Subject::<i32>::new();
    let first = subject.to_future();
    assert_eq!(subject.subscribers(), 1);

    subject.push(4);
    subject.push(5);
    assert_eq!(first.value(), Some(Ok(4)));
    assert_eq!(subject.subscribers(), 0);
  }

  #[rxcore_macro::test]
  fn replayed_value_completes_immediately() {
    let subject = ReplaySubject::<i32>::new();
    subject.push(1);
    subject.push(2);
    let first = subject.to_future();
    assert_eq!(first.value(), Some(Ok(1)));
    assert_eq!(subject.subscribers(), 0);
  }

  #[rxcore_macro::test]
  fn finish_before_value_abandons() {
    let subject = Subject::<i32>::new();
    let first = subject.to_future();
    subject.finish();
    assert_eq!(first.value(), Some(Err(Failure::Abandoned)));
  }
}

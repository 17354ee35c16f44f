use std::{
  pin::Pin,
  task::{Context, Poll},
};

use futures::{channel::mpsc, Stream, StreamExt};

use crate::{observable::Observable, subscription::Subscription};

/// A [`Stream`] of an observable's values, ending when it finishes.
///
/// Values are buffered without bound until polled. Dropping the stream
/// unsubscribes from the observable.
#[must_use = "streams do nothing unless polled"]
pub struct ObservableStream<A> {
  rx: mpsc::UnboundedReceiver<A>,
  subscription: Subscription,
}

impl<A: Clone + 'static> Observable<A> {
  pub fn into_stream(self) -> ObservableStream<A> {
    let (tx, rx) = mpsc::unbounded();
    let closer = tx.clone();
    let subscription = self.subscribe_with(
      move |a| {
        let _ = tx.unbounded_send(a);
      },
      move || closer.close_channel(),
    );
    ObservableStream { rx, subscription }
  }
}

impl<A> Stream for ObservableStream<A> {
  type Item = A;

  fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<A>> {
    self.rx.poll_next_unpin(cx)
  }
}

impl<A> Drop for ObservableStream<A> {
  fn drop(&mut self) { self.subscription.unsubscribe() }
}

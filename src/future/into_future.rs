//! `async`/`await` bridge for [`Future`].
//!
//! Awaiting registers an error-aware listener and resolves with the outcome.
//! When every promise of a pending cell is dropped before completing it, the
//! awaiting task resolves with [`Failure::Abandoned`] instead of hanging.

use std::{
  future::{Future as StdFuture, IntoFuture},
  pin::Pin,
  task::{Context, Poll},
};

use futures::channel::oneshot;

use super::{Future, FutureKind, Outcome};
use crate::error::Failure;

/// The `std::future::Future` returned by awaiting a [`Future`].
#[must_use = "futures do nothing unless you `.await` or poll them"]
pub struct OutcomeFuture<A> {
  rx: oneshot::Receiver<Outcome<A>>,
  // Held for unfulfilled sources so the receiver stays pending.
  _never: Option<oneshot::Sender<Outcome<A>>>,
}

impl<A: Clone + 'static> IntoFuture for Future<A> {
  type Output = Outcome<A>;
  type IntoFuture = OutcomeFuture<A>;

  fn into_future(self) -> Self::IntoFuture {
    let (tx, rx) = oneshot::channel();
    if self.kind() == FutureKind::Unfulfilled {
      return OutcomeFuture { rx, _never: Some(tx) };
    }
    self.on_complete(move |outcome| {
      let _ = tx.send(outcome);
    });
    OutcomeFuture { rx, _never: None }
  }
}

impl<A> StdFuture for OutcomeFuture<A> {
  type Output = Outcome<A>;

  fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
    match Pin::new(&mut self.rx).poll(cx) {
      Poll::Ready(Ok(outcome)) => Poll::Ready(outcome),
      Poll::Ready(Err(oneshot::Canceled)) => Poll::Ready(Err(Failure::Abandoned)),
      Poll::Pending => Poll::Pending,
    }
  }
}

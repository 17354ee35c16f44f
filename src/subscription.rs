use std::{
  cell::{Cell, RefCell},
  fmt::{Debug, Formatter},
  rc::Rc,
};

use smallvec::SmallVec;

mod tracker;
pub use tracker::SubscriptionTracker;

/// A handle that stops further delivery to one registration.
pub trait SubscriptionLike {
  /// Idempotent, a second call does nothing.
  fn unsubscribe(&self);

  fn is_closed(&self) -> bool;

  /// Activates "RAII" behavior for this subscription. That means
  /// `unsubscribe()` will be called automatically as soon as the returned
  /// value goes out of scope.
  #[must_use]
  fn unsubscribe_when_dropped(self) -> SubscriptionGuard<Self>
  where
    Self: Sized,
  {
    SubscriptionGuard(self)
  }
}

/// Cancellation token returned by `subscribe` and `on_complete`.
///
/// Clones share the same state: unsubscribing any clone closes them all.
/// [`Subscription::empty`] is already closed and costs no allocation, it is
/// what registrations that fired synchronously hand back.
#[derive(Clone, Default)]
pub struct Subscription(Option<Rc<Inner>>);

struct Inner {
  closed: Cell<bool>,
  teardown: RefCell<SmallVec<[Box<dyn FnOnce()>; 1]>>,
}

impl Subscription {
  /// An open subscription that runs `teardown` once, on the first
  /// `unsubscribe`.
  pub fn new(teardown: impl FnOnce() + 'static) -> Self {
    let sub = Self::composite();
    sub.add_teardown(teardown);
    sub
  }

  /// An open subscription with nothing attached yet.
  pub fn composite() -> Self {
    Subscription(Some(Rc::new(Inner { closed: Cell::new(false), teardown: RefCell::default() })))
  }

  /// A closed subscription.
  #[inline]
  pub fn empty() -> Self { Subscription(None) }

  pub fn unsubscribe(&self) {
    let Some(inner) = &self.0 else { return };
    if inner.closed.replace(true) {
      return;
    }
    let teardown = std::mem::take(&mut *inner.teardown.borrow_mut());
    for f in teardown {
      f();
    }
  }

  #[inline]
  pub fn is_closed(&self) -> bool { self.0.as_ref().is_none_or(|inner| inner.closed.get()) }

  /// Ties `child` to this subscription. A closed parent unsubscribes the
  /// child immediately.
  pub fn add<S: SubscriptionLike + 'static>(&self, child: S) {
    if child.is_closed() {
      return;
    }
    self.add_teardown(move || child.unsubscribe());
  }

  pub fn add_teardown(&self, f: impl FnOnce() + 'static) {
    match &self.0 {
      Some(inner) if !inner.closed.get() => {
        let mut teardown = inner.teardown.borrow_mut();
        teardown.push(Box::new(f));
      }
      _ => f(),
    }
  }

  /// Marks the registration as spent without running its teardown.
  pub(crate) fn close(&self) {
    if let Some(inner) = &self.0 {
      inner.closed.set(true);
      let spent = std::mem::take(&mut *inner.teardown.borrow_mut());
      drop(spent);
    }
  }
}

impl SubscriptionLike for Subscription {
  #[inline]
  fn unsubscribe(&self) { Subscription::unsubscribe(self) }

  #[inline]
  fn is_closed(&self) -> bool { Subscription::is_closed(self) }
}

impl Debug for Subscription {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Subscription")
      .field("is_closed", &self.is_closed())
      .field(
        "teardown_count",
        &self.0.as_ref().map_or(0, |inner| inner.teardown.borrow().len()),
      )
      .finish()
  }
}

/// An RAII implementation of a "scoped subscribed" of a subscription.
/// When this structure is dropped (falls out of scope), the subscription will
/// be unsubscribed.
///
/// Implements `must_use` to prevent immediate unsubscribing.
#[must_use]
#[derive(Debug)]
pub struct SubscriptionGuard<T: SubscriptionLike>(pub(crate) T);

impl<T: SubscriptionLike> SubscriptionGuard<T> {
  pub fn inner(&self) -> &T { &self.0 }
}

impl<T: SubscriptionLike> Drop for SubscriptionGuard<T> {
  #[inline]
  fn drop(&mut self) { self.0.unsubscribe() }
}

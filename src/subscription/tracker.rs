use std::cell::{Cell, RefCell};

use smallvec::SmallVec;

use super::{Subscription, SubscriptionLike};

/// Owns a dynamic set of subscriptions and unsubscribes whatever is still
/// tracked when it is unsubscribed or dropped.
///
/// Closed entries are pruned each time a new one is tracked, so the set stays
/// proportional to the number of live registrations.
///
/// ```rust
/// use rxcore::prelude::*;
///
/// let tracker = SubscriptionTracker::new();
/// let subject = Subject::<i32>::new();
/// let id = tracker.track(subject.subscribe(|_| {}));
/// tracker.track(subject.subscribe(|_| {}));
/// assert_eq!(subject.subscribers(), 2);
///
/// if let Some(sub) = tracker.untrack(id) {
///   sub.unsubscribe();
/// }
/// assert_eq!(tracker.len(), 1);
///
/// drop(tracker);
/// assert_eq!(subject.subscribers(), 0);
/// ```
#[derive(Default)]
pub struct SubscriptionTracker {
  next_id: Cell<usize>,
  closed: Cell<bool>,
  items: RefCell<SmallVec<[(usize, Subscription); 2]>>,
}

impl SubscriptionTracker {
  pub fn new() -> Self { Self::default() }

  /// Tracks `sub` and returns its id. Tracking into an unsubscribed tracker
  /// unsubscribes `sub` right away.
  pub fn track(&self, sub: Subscription) -> usize {
    let id = self.next_id.get();
    self.next_id.set(id + 1);
    if self.closed.get() {
      sub.unsubscribe();
      return id;
    }
    let mut items = self.items.borrow_mut();
    items.retain(|(_, s)| !s.is_closed());
    if !sub.is_closed() {
      items.push((id, sub));
    }
    id
  }

  /// Stops tracking the subscription with `id` and gives it back.
  pub fn untrack(&self, id: usize) -> Option<Subscription> {
    let mut items = self.items.borrow_mut();
    items.iter().position(|(i, _)| *i == id).map(|pos| items.remove(pos).1)
  }

  /// Number of tracked subscriptions that are still open.
  pub fn len(&self) -> usize { self.items.borrow().iter().filter(|(_, s)| !s.is_closed()).count() }

  pub fn is_empty(&self) -> bool { self.len() == 0 }

  pub fn unsubscribe_all(&self) {
    let items = std::mem::take(&mut *self.items.borrow_mut());
    for (_, sub) in items {
      sub.unsubscribe();
    }
  }
}

impl SubscriptionLike for SubscriptionTracker {
  fn unsubscribe(&self) {
    self.closed.set(true);
    self.unsubscribe_all();
  }

  fn is_closed(&self) -> bool { self.closed.get() }
}

impl Drop for SubscriptionTracker {
  fn drop(&mut self) { self.unsubscribe_all() }
}

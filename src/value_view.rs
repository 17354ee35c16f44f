//! A continuously readable latest value derived from a stream.

use std::{
  cell::RefCell,
  rc::{Rc, Weak},
};

use crate::{
  future::Future,
  observable::Observable,
  subject::Subject,
  subscription::Subscription,
};

struct ViewState<A> {
  value: RefCell<A>,
  changes: Subject<A>,
}

impl<A: Clone + 'static> ViewState<A> {
  fn set(&self, value: A) {
    *self.value.borrow_mut() = value.clone();
    self.changes.push(value);
  }
}

/// Holds the latest value of its source.
///
/// The view stays subscribed to the source for its whole lifetime, whether
/// or not anything listens to the view itself, and releases the source when
/// dropped.
pub struct ValueView<A: Clone + 'static> {
  state: Rc<ViewState<A>>,
  link: Subscription,
}

impl<A: Clone + 'static> ValueView<A> {
  fn new(initial: A) -> Self {
    let state = Rc::new(ViewState { value: RefCell::new(initial), changes: Subject::new() });
    ValueView { state, link: Subscription::empty() }
  }

  fn setter(&self) -> impl Fn(A) + 'static {
    let state: Weak<ViewState<A>> = Rc::downgrade(&self.state);
    move |value| {
      if let Some(state) = state.upgrade() {
        state.set(value);
      }
    }
  }

  pub fn get(&self) -> A { self.state.value.borrow().clone() }

  /// Calls `on_value` with the current value right away, then with every
  /// later value.
  pub fn subscribe(&self, mut on_value: impl FnMut(A) + 'static) -> Subscription {
    on_value(self.get());
    self.state.changes.subscribe(on_value)
  }

  /// Values arriving after this call, without the current one.
  pub fn changes(&self) -> Observable<A> { self.state.changes.observable() }
}

impl<A: Clone + 'static> Drop for ValueView<A> {
  fn drop(&mut self) { self.link.unsubscribe() }
}

impl<A: Clone + 'static> Observable<A> {
  /// A view starting at `initial` and following every later value.
  pub fn to_current_value_view(&self, initial: A) -> ValueView<A> {
    let mut view = ValueView::new(initial);
    let set = view.setter();
    view.link = self.subscribe(set);
    view
  }
}

impl<A: Clone + 'static> Future<A> {
  /// A view holding `while_pending` until the future succeeds, then its
  /// value. A failure leaves `while_pending` in place.
  pub fn to_value_view(&self, while_pending: A) -> ValueView<A> {
    let mut view = ValueView::new(while_pending);
    let set = view.setter();
    view.link = self.on_success(set);
    view
  }
}

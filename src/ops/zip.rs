//! Combine-latest: once every source has produced a value, each new value
//! from any source emits the tuple of the latest values.

use std::{
  cell::{Cell, RefCell},
  rc::Rc,
};

use super::countdown;
use crate::{
  observable::{Observable, Sink},
  subscription::Subscription,
};

type Latest<A, B> = Rc<RefCell<(Option<A>, Option<B>)>>;

impl<A: Clone + 'static> Observable<A> {
  /// Combines the latest values of `self` and `other`. Finishes when both
  /// have finished.
  pub fn zip<B: Clone + 'static>(&self, other: &Observable<B>) -> Observable<(A, B)> {
    let (left, right) = (self.clone(), other.clone());
    Observable::create(move |sink: Sink<(A, B)>| {
      let latest: Latest<A, B> = Rc::default();
      let remaining = Rc::new(Cell::new(2));
      let link = Subscription::composite();

      let on_left = {
        let (latest, sink) = (latest.clone(), sink.clone());
        move |a: A| {
          let pair = {
            let mut latest = latest.borrow_mut();
            latest.0 = Some(a.clone());
            latest.1.clone().map(|b| (a, b))
          };
          if let Some(pair) = pair {
            sink.push(pair)
          }
        }
      };
      link.add(left.subscribe_with(on_left, countdown(&remaining, &sink)));

      let on_right = {
        let (latest, sink) = (latest.clone(), sink.clone());
        move |b: B| {
          let pair = {
            let mut latest = latest.borrow_mut();
            latest.1 = Some(b.clone());
            latest.0.clone().map(|a| (a, b))
          };
          if let Some(pair) = pair {
            sink.push(pair)
          }
        }
      };
      link.add(right.subscribe_with(on_right, countdown(&remaining, &sink)));
      link
    })
  }

  pub fn zip3<B, C>(&self, b: &Observable<B>, c: &Observable<C>) -> Observable<(A, B, C)>
  where
    B: Clone + 'static,
    C: Clone + 'static,
  {
    self.zip(b).zip(c).map(|((a, b), c)| (a, b, c))
  }
}

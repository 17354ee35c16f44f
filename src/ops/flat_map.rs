use std::{cell::RefCell, rc::Rc};

use crate::{
  future::Future,
  observable::{Observable, Sink},
  subscription::{Subscription, SubscriptionTracker},
};

impl<A: Clone + 'static> Observable<A> {
  /// Maps every value to an inner observable and forwards the values of the
  /// latest one, unsubscribing the previous inner observable.
  ///
  /// Finishes when the source finishes.
  pub fn flat_map<B: Clone + 'static>(
    &self,
    f: impl Fn(A) -> Observable<B> + 'static,
  ) -> Observable<B> {
    let source = self.clone();
    let f = Rc::new(f);
    Observable::create(move |sink: Sink<B>| {
      let inner = Rc::new(RefCell::new(Subscription::empty()));
      let link = Subscription::composite();
      let on_event = {
        let (f, sink, inner) = (f.clone(), sink.clone(), inner.clone());
        move |a: A| {
          inner.replace(Subscription::empty()).unsubscribe();
          let sink = sink.clone();
          let sub = f(a).subscribe(move |b| sink.push(b));
          inner.replace(sub).unsubscribe();
        }
      };
      let finisher = sink.clone();
      link.add(source.subscribe_with(on_event, move || finisher.finish()));
      link.add_teardown(move || inner.replace(Subscription::empty()).unsubscribe());
      link
    })
  }

  /// Emits every item `f` yields for each value.
  pub fn flat_map_iter<B, I>(&self, f: impl Fn(A) -> I + 'static) -> Observable<B>
  where
    B: Clone + 'static,
    I: IntoIterator<Item = B>,
  {
    let f = Rc::new(f);
    self.lift(move || {
      let f = f.clone();
      move |a: A, sink: &Sink<B>| f(a).into_iter().for_each(|b| sink.push(b))
    })
  }

  /// Emits the value of each future `f` returns once it succeeds. Futures
  /// still pending when the observable disconnects are ignored.
  pub fn flat_map_future<B: Clone + 'static>(
    &self,
    f: impl Fn(A) -> Future<B> + 'static,
  ) -> Observable<B> {
    let source = self.clone();
    let f = Rc::new(f);
    Observable::create(move |sink: Sink<B>| {
      let pending = Rc::new(SubscriptionTracker::new());
      let link = Subscription::composite();
      let on_event = {
        let (f, sink, pending) = (f.clone(), sink.clone(), pending.clone());
        move |a: A| {
          let sink = sink.clone();
          pending.track(f(a).on_success(move |b| sink.push(b)));
        }
      };
      let finisher = sink.clone();
      link.add(source.subscribe_with(on_event, move || finisher.finish()));
      link.add_teardown(move || pending.unsubscribe_all());
      link
    })
  }
}

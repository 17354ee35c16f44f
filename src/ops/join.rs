use std::{cell::Cell, rc::Rc};

use super::countdown;
use crate::{
  observable::{Observable, Sink},
  subscription::Subscription,
};

impl<A: Clone + 'static> Observable<A> {
  /// Merges the values of every source. Finishes once all of them have
  /// finished; with no sources it finishes as soon as it is subscribed to.
  pub fn join_all(sources: impl IntoIterator<Item = Observable<A>>) -> Observable<A> {
    let sources: Rc<[Observable<A>]> = sources.into_iter().collect();
    Observable::create(move |sink: Sink<A>| {
      if sources.is_empty() {
        sink.finish();
        return Subscription::empty();
      }
      let remaining = Rc::new(Cell::new(sources.len()));
      let link = Subscription::composite();
      for source in sources.iter() {
        let events = sink.clone();
        link.add(source.subscribe_with(move |a| events.push(a), countdown(&remaining, &sink)));
      }
      link
    })
  }

  pub fn join(&self, other: &Observable<A>) -> Observable<A> {
    Observable::join_all([self.clone(), other.clone()])
  }
}

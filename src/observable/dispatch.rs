//! Listener registry and reentrancy-safe dispatch shared by every observable.
//!
//! `push` enqueues and, unless a dispatch is already running further up the
//! stack, drains the queue: each value is delivered to a snapshot of the
//! listeners active when its round starts. Values pushed by listeners wait
//! for the current round to reach every listener, so delivery is breadth
//! first. Listeners added during a round become active when it ends; a
//! listener unsubscribed during a round is skipped for the rest of it.
//!
//! A listener that panics unwinds out of the outermost `push`. The values
//! still queued by that drain are discarded, a `finish` requested during it
//! still runs, and the core is left ready for the next `push`.

use std::{
  cell::{Cell, RefCell},
  collections::VecDeque,
  panic::{self, AssertUnwindSafe},
  rc::Rc,
};

use smallvec::SmallVec;

use super::Sink;
use crate::subscription::Subscription;

pub(crate) type Connect<A> = Box<dyn Fn(Sink<A>) -> Subscription>;

struct Entry<A> {
  id: usize,
  token: Subscription,
  active: Cell<bool>,
  on_event: RefCell<Box<dyn FnMut(A)>>,
  on_finish: RefCell<Option<Box<dyn FnOnce()>>>,
}

/// Upstream of a derived observable, connected while it has listeners.
struct Upstream<A> {
  connect: Connect<A>,
  link: RefCell<Option<Subscription>>,
}

pub(crate) struct Core<A> {
  listeners: RefCell<SmallVec<[Rc<Entry<A>>; 2]>>,
  next_id: Cell<usize>,
  pending: RefCell<VecDeque<A>>,
  dispatching: Cell<bool>,
  finish_requested: Cell<bool>,
  finished: Cell<bool>,
  history: Option<RefCell<Vec<A>>>,
  upstream: Option<Upstream<A>>,
}

impl<A: Clone + 'static> Core<A> {
  pub(crate) fn new(replay: bool, connect: Option<Connect<A>>) -> Rc<Self> {
    Rc::new(Core {
      listeners: RefCell::default(),
      next_id: Cell::new(0),
      pending: RefCell::default(),
      dispatching: Cell::new(false),
      finish_requested: Cell::new(false),
      finished: Cell::new(false),
      history: replay.then(RefCell::default),
      upstream: connect.map(|connect| Upstream { connect, link: RefCell::new(None) }),
    })
  }

  pub(crate) fn subscribe(
    self: &Rc<Self>,
    on_event: Box<dyn FnMut(A)>,
    on_finish: Option<Box<dyn FnOnce()>>,
  ) -> Subscription {
    let mut on_event = on_event;
    if self.finished.get() {
      self.replay(on_event.as_mut(), &Subscription::composite());
      if let Some(on_finish) = on_finish {
        on_finish();
      }
      return Subscription::empty();
    }

    let id = self.next_id.get();
    self.next_id.set(id + 1);
    let core = Rc::downgrade(self);
    let token = Subscription::new(move || {
      if let Some(core) = core.upgrade() {
        core.remove(id);
      }
    });

    self.replay(on_event.as_mut(), &token);
    if token.is_closed() {
      return token;
    }
    if self.finished.get() {
      if let Some(on_finish) = on_finish {
        on_finish();
      }
      token.close();
      return token;
    }

    let entry = Rc::new(Entry {
      id,
      token: token.clone(),
      active: Cell::new(!self.dispatching.get()),
      on_event: RefCell::new(on_event),
      on_finish: RefCell::new(on_finish),
    });
    self.listeners.borrow_mut().push(entry);
    self.connect();
    token
  }

  /// Delivers the recorded history, including values recorded while
  /// replaying, until `token` closes.
  fn replay(&self, on_event: &mut dyn FnMut(A), token: &Subscription) {
    let Some(history) = &self.history else { return };
    let mut idx = 0;
    while !token.is_closed() {
      let next = history.borrow().get(idx).cloned();
      let Some(value) = next else { break };
      on_event(value);
      idx += 1;
    }
  }

  pub(crate) fn push(&self, value: A) {
    self.pending.borrow_mut().push_back(value);
    if !self.dispatching.get() {
      self.drain();
    }
  }

  fn drain(&self) {
    self.dispatching.set(true);
    let rounds = panic::catch_unwind(AssertUnwindSafe(|| self.run_rounds()));
    self.dispatching.set(false);
    if rounds.is_err() {
      self.pending.borrow_mut().clear();
      self.listeners.borrow().iter().for_each(|e| e.active.set(true));
    }

    if self.finish_requested.get() && !self.finished.get() {
      self.finish_now();
    }
    if let Err(payload) = rounds {
      panic::resume_unwind(payload);
    }
  }

  fn run_rounds(&self) {
    loop {
      let next = self.pending.borrow_mut().pop_front();
      let Some(value) = next else { break };
      if let Some(history) = &self.history {
        history.borrow_mut().push(value.clone());
      }

      let snapshot: SmallVec<[Rc<Entry<A>>; 4]> =
        self.listeners.borrow().iter().filter(|e| e.active.get()).cloned().collect();
      for entry in snapshot {
        if entry.token.is_closed() {
          continue;
        }
        let mut on_event = entry.on_event.borrow_mut();
        (*on_event)(value.clone());
      }

      self.listeners.borrow().iter().for_each(|e| e.active.set(true));
    }
  }

  /// Finishes now, or once the running dispatch has drained its queue.
  pub(crate) fn finish(&self) {
    if self.finish_requested.replace(true) {
      return;
    }
    if !self.dispatching.get() {
      self.finish_now();
    }
  }

  fn finish_now(&self) {
    self.finished.set(true);
    self.disconnect();
    let entries = std::mem::take(&mut *self.listeners.borrow_mut());
    for entry in entries {
      if entry.token.is_closed() {
        continue;
      }
      let on_finish = entry.on_finish.borrow_mut().take();
      if let Some(on_finish) = on_finish {
        on_finish();
      }
      entry.token.unsubscribe();
    }
  }

  pub(crate) fn is_finished(&self) -> bool { self.finished.get() }

  /// True once `finish` was called, even if the drain it waits for is still
  /// running.
  pub(crate) fn is_finishing(&self) -> bool { self.finish_requested.get() }

  pub(crate) fn subscribers(&self) -> usize {
    self.listeners.borrow().iter().filter(|e| e.active.get() && !e.token.is_closed()).count()
  }

  pub(crate) fn clear_history(&self) {
    if let Some(history) = &self.history {
      history.borrow_mut().clear();
    }
  }

  fn remove(&self, id: usize) {
    let removed = {
      let mut listeners = self.listeners.borrow_mut();
      let pos = listeners.iter().position(|e| e.id == id);
      pos.map(|pos| listeners.remove(pos))
    };
    drop(removed);
    if self.listeners.borrow().is_empty() {
      self.disconnect();
    }
  }

  fn connect(self: &Rc<Self>) {
    let Some(upstream) = &self.upstream else { return };
    if upstream.link.borrow().is_some() || self.is_finishing() {
      return;
    }
    let link = Subscription::composite();
    *upstream.link.borrow_mut() = Some(link.clone());
    link.add((upstream.connect)(Sink(self.clone())));
  }

  fn disconnect(&self) {
    let link = self.upstream.as_ref().and_then(|upstream| upstream.link.borrow_mut().take());
    if let Some(link) = link {
      link.unsubscribe();
    }
  }
}

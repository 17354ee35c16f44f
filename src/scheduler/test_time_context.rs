//! Virtual-time clock for deterministic tests of `delay` and `timeout`.
//!
//! Tasks run synchronously while time is advanced, ordered by due time and
//! then by the order they were scheduled in.
//!
//! ```rust
//! use std::time::Duration;
//!
//! use rxcore::prelude::*;
//!
//! let clock = TestTimeContext::new();
//! let delayed = Future::successful(42).delay(Duration::from_millis(100), &clock);
//! assert_eq!(delayed.value(), None);
//!
//! clock.advance_by(Duration::from_millis(100));
//! assert_eq!(delayed.value(), Some(Ok(42)));
//! ```

use std::{
  cell::{Cell, RefCell},
  cmp::Ordering,
  collections::BinaryHeap,
  rc::Rc,
  time::Duration,
};

use super::TimeContext;
use crate::subscription::Subscription;

#[derive(Default)]
struct State {
  now: Duration,
  queue: BinaryHeap<ScheduledTask>,
  next_task_id: usize,
}

struct ScheduledTask {
  due: Duration,
  task_id: usize,
  task: Box<dyn FnOnce()>,
  cancelled: Rc<Cell<bool>>,
}

impl PartialEq for ScheduledTask {
  fn eq(&self, other: &Self) -> bool { self.due == other.due && self.task_id == other.task_id }
}

impl Eq for ScheduledTask {}

impl PartialOrd for ScheduledTask {
  fn partial_cmp(&self, other: &Self) -> Option<Ordering> { Some(self.cmp(other)) }
}

impl Ord for ScheduledTask {
  fn cmp(&self, other: &Self) -> Ordering {
    // Min-heap: earlier times first, then FIFO by task_id
    other.due.cmp(&self.due).then_with(|| other.task_id.cmp(&self.task_id))
  }
}

/// A manually advanced clock. Clones share the same timeline.
#[derive(Clone, Default)]
pub struct TestTimeContext(Rc<RefCell<State>>);

impl TestTimeContext {
  pub fn new() -> Self { Self::default() }

  pub fn advance_by(&self, duration: Duration) {
    let target = self.now() + duration;
    self.advance_to(target);
  }

  /// Runs every task due at or before `target`, including tasks scheduled by
  /// those tasks, then leaves the clock at `target`.
  pub fn advance_to(&self, target: Duration) {
    while let Some(task) = self.pop_due(Some(target)) {
      (task.task)();
    }
    let mut state = self.0.borrow_mut();
    if state.now < target {
      state.now = target;
    }
  }

  /// Runs all pending tasks, advancing time to each one's due time.
  pub fn flush(&self) {
    while let Some(task) = self.pop_due(None) {
      (task.task)();
    }
  }

  /// Number of scheduled tasks that have not been cancelled.
  pub fn pending_count(&self) -> usize {
    self.0.borrow().queue.iter().filter(|t| !t.cancelled.get()).count()
  }

  fn pop_due(&self, limit: Option<Duration>) -> Option<ScheduledTask> {
    let mut state = self.0.borrow_mut();
    loop {
      match state.queue.peek() {
        Some(next) if limit.is_none_or(|limit| next.due <= limit) => {}
        _ => return None,
      }
      let task = state.queue.pop()?;
      if task.cancelled.get() {
        continue;
      }
      if state.now < task.due {
        state.now = task.due;
      }
      return Some(task);
    }
  }
}

impl TimeContext for TestTimeContext {
  fn now(&self) -> Duration { self.0.borrow().now }

  fn after(&self, delay: Duration, task: Box<dyn FnOnce()>) -> Subscription {
    let cancelled = Rc::new(Cell::new(false));
    let mut state = self.0.borrow_mut();
    let task_id = state.next_task_id;
    state.next_task_id += 1;
    let due = state.now + delay;
    state.queue.push(ScheduledTask { due, task_id, task, cancelled: cancelled.clone() });
    Subscription::new(move || cancelled.set(true))
  }
}

//! # rxcore: single-threaded futures and observables
//!
//! Callback-driven building blocks for code that runs on one logical thread,
//! such as a frame or event loop: write-once [`Future`]s completed through a
//! [`Promise`], multicast [`Observable`]s fed by a [`Subject`], and an
//! [`AsyncQueue`] bounding how many operations run at once.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::{cell::RefCell, rc::Rc};
//!
//! use rxcore::prelude::*;
//!
//! let subject = Subject::new();
//! let seen = Rc::new(RefCell::new(vec![]));
//! let c_seen = seen.clone();
//! let sub = subject
//!   .filter(|v: &i32| v % 2 == 0)
//!   .map(|v| v * 10)
//!   .subscribe(move |v| c_seen.borrow_mut().push(v));
//!
//! (0..5).for_each(|v| subject.push(v));
//! sub.unsubscribe();
//! assert_eq!(*seen.borrow(), [0, 20, 40]);
//!
//! let (future, promise) = Future::create();
//! let doubled = future.map(|v: i32| v * 2);
//! promise.complete_success(21);
//! assert_eq!(doubled.value(), Some(Ok(42)));
//! ```
//!
//! ## Key Concepts
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Future`] / [`Promise`] | Write-once cell and its write capability |
//! | [`Observable`] / [`Subject`] | Multicast stream with breadth-first dispatch |
//! | [`Subscription`] | Idempotent cancellation token |
//! | [`AsyncQueue`] | FIFO with bounded concurrency |
//! | [`TimeContext`] | Injected timer source for `delay` and `timeout` |
//!
//! ## Feature Flags
//!
//! - **`tracing`** (default): logs unhandled future failures and dropped
//!   values through the `tracing` crate.
//!
//! [`Future`]: future::Future
//! [`Promise`]: future::Promise
//! [`Observable`]: observable::Observable
//! [`Subject`]: subject::Subject
//! [`Subscription`]: subscription::Subscription
//! [`AsyncQueue`]: queue::AsyncQueue
//! [`TimeContext`]: scheduler::TimeContext

pub mod error;
pub mod future;
pub mod observable;
pub mod ops;
pub mod prelude;
pub mod queue;
pub mod scheduler;
pub mod subject;
pub mod subscription;
pub mod value_view;

pub use prelude::*;

#[cfg(all(doctest, not(target_arch = "wasm32")))]
mod __markdown_doctests {
  mod readme {
    #![doc = include_str!("../README.md")]
  }
}

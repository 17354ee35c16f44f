//! Error types.
//!
//! [`RxError`] describes misuse of a write handle: completing a promise twice
//! or pushing into a finished subject. The strict entry points panic with its
//! message, the `try_*` variants hand it back.
//!
//! [`Failure`] is the error half of an [`Outcome`](crate::future::Outcome).
//! It travels through future combinators as a value and is `Clone` so every
//! listener of a cell receives its own copy.

use std::{
  any::Any,
  error::Error as StdError,
  panic::{self, AssertUnwindSafe},
  rc::Rc,
  time::Duration,
};

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RxError {
  #[error("promise is already completed")]
  AlreadyCompleted,
  #[error("observable is already finished")]
  Finished,
}

#[derive(Debug, Clone, Error)]
pub enum Failure {
  /// A user closure panicked while computing a derived value.
  #[error("panicked: {0}")]
  Panicked(Rc<str>),
  #[error("timed out after {0:?}")]
  TimedOut(Duration),
  /// Every promise of the cell was dropped while someone was still awaiting
  /// it.
  #[error("promise dropped before completion")]
  Abandoned,
  #[error("{0}")]
  Message(Rc<str>),
  #[error("{0}")]
  Other(Rc<dyn StdError>),
}

impl Failure {
  pub fn message(msg: impl Into<String>) -> Self { Failure::Message(msg.into().into()) }

  pub fn other<E: StdError + 'static>(err: E) -> Self { Failure::Other(Rc::new(err)) }

  pub(crate) fn from_panic(payload: Box<dyn Any + Send>) -> Self {
    let msg: Rc<str> = if let Some(s) = payload.downcast_ref::<&'static str>() {
      (*s).into()
    } else if let Some(s) = payload.downcast_ref::<String>() {
      s.as_str().into()
    } else {
      "non-string panic payload".into()
    };
    Failure::Panicked(msg)
  }
}

impl PartialEq for Failure {
  fn eq(&self, other: &Self) -> bool {
    match (self, other) {
      (Failure::Panicked(a), Failure::Panicked(b)) | (Failure::Message(a), Failure::Message(b)) => {
        a == b
      }
      (Failure::TimedOut(a), Failure::TimedOut(b)) => a == b,
      (Failure::Abandoned, Failure::Abandoned) => true,
      (Failure::Other(a), Failure::Other(b)) => Rc::ptr_eq(a, b),
      _ => false,
    }
  }
}

/// Runs `f`, turning a panic into [`Failure::Panicked`].
pub(crate) fn catch_failure<R>(f: impl FnOnce() -> R) -> Result<R, Failure> {
  panic::catch_unwind(AssertUnwindSafe(f)).map_err(Failure::from_panic)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[rxcore_macro::test]
  fn panic_payloads_become_messages() {
    let failure = catch_failure(|| panic!("boom")).unwrap_err();
    assert_eq!(failure, Failure::Panicked("boom".into()));

    let code = 7;
    let failure = catch_failure(|| panic!("code {code}")).unwrap_err();
    assert_eq!(failure.to_string(), "panicked: code 7");
  }

  #[rxcore_macro::test]
  fn other_compares_by_identity() {
    let io = Failure::other(std::io::Error::other("disk"));
    assert_eq!(io, io.clone());
    assert_ne!(io, Failure::other(std::io::Error::other("disk")));
    assert_eq!(io.to_string(), "disk");
  }

  #[rxcore_macro::test]
  fn misuse_messages() {
    assert_eq!(RxError::AlreadyCompleted.to_string(), "promise is already completed");
    assert_eq!(RxError::Finished.to_string(), "observable is already finished");
  }
}

//! Prelude module for convenient imports

pub use crate::{
  error::{Failure, RxError},
  future::{Future, FutureKind, Outcome, OutcomeFuture, Promise},
  observable::{Observable, Sink},
  ops::into_stream::ObservableStream,
  queue::AsyncQueue,
  scheduler::{TestTimeContext, TimeContext},
  subject::{ReplaySubject, Subject},
  subscription::{Subscription, SubscriptionGuard, SubscriptionLike, SubscriptionTracker},
  value_view::ValueView,
};

//! # Closure-backed subscriber (`SubscriberFn`)
//!
//! [`SubscriberFn`] wraps plain closures into a [`Subscriber`], which keeps
//! tests and simple hosts free of one-off trait impls. The closures are
//! synchronous; a consumer that needs to await (network writes, batching)
//! implements [`Subscriber`] directly instead.
//!
//! ## Example
//! ```rust
//! use topicbus::{Message, SubscriberFn, SubscriptionHandle};
//!
//! let sub = SubscriberFn::arc("printer", |msg: &Message, _h: &SubscriptionHandle| {
//!     println!("{}: {} bytes", msg.topic, msg.body.len());
//! });
//! assert_eq!(topicbus::Subscriber::name(&*sub), "printer");
//! ```

use std::borrow::Cow;
use std::sync::Arc;

use async_trait::async_trait;

use crate::bus::SubscriptionHandle;
use crate::message::Message;

use super::Subscriber;

fn noop() {}

/// Function-backed subscriber implementation.
#[derive(Debug)]
pub struct SubscriberFn<F, S = fn()> {
    name: Cow<'static, str>,
    message_fn: F,
    shutdown_fn: S,
}

impl<F> SubscriberFn<F> {
    /// Creates a subscriber from a message closure, with a no-op shutdown.
    pub fn new(name: impl Into<Cow<'static, str>>, message_fn: F) -> Self {
        Self {
            name: name.into(),
            message_fn,
            shutdown_fn: noop,
        }
    }

    /// Creates the subscriber and returns it as a shared handle.
    ///
    /// Prefer this when immediately passing it to
    /// [`Bus::subscribe`](crate::Bus::subscribe).
    pub fn arc(name: impl Into<Cow<'static, str>>, message_fn: F) -> Arc<Self> {
        Arc::new(Self::new(name, message_fn))
    }
}

impl<F, S> SubscriberFn<F, S> {
    /// Attaches a shutdown closure, replacing the no-op default.
    pub fn with_shutdown<S2>(self, shutdown_fn: S2) -> SubscriberFn<F, S2> {
        SubscriberFn {
            name: self.name,
            message_fn: self.message_fn,
            shutdown_fn,
        }
    }

    /// Wraps `self` into a shared handle.
    pub fn into_arc(self) -> Arc<Self> {
        Arc::new(self)
    }
}

#[async_trait]
impl<F, S> Subscriber for SubscriberFn<F, S>
where
    F: Fn(&Message, &SubscriptionHandle) + Send + Sync + 'static,
    S: Fn() + Send + Sync + 'static,
{
    async fn on_message(&self, msg: &Message, handle: &SubscriptionHandle) {
        (self.message_fn)(msg, handle);
    }

    async fn on_shutdown(&self) {
        (self.shutdown_fn)();
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_and_composed() {
        let sub = SubscriberFn::new("counter", |_m: &Message, _h: &SubscriptionHandle| {})
            .with_shutdown(|| {});
        assert_eq!(Subscriber::name(&sub), "counter");
    }
}

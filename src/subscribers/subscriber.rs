//! # Core subscriber trait
//!
//! `Subscriber` is the extension point for plugging consumers into a bus.
//! Each registered subscriber is driven by a dedicated worker task owned by
//! the bus strategy, so implementations may be slow (I/O, batching) without
//! blocking the publisher or other subscribers.
//!
//! ## Contract
//! - `on_message` is invoked once per matching message, in publish order as
//!   observed by this subscriber (the ring-buffer strategy may skip lapped
//!   messages; see [`RingBus`](crate::RingBus)).
//! - `on_shutdown` is invoked exactly once when the subscription terminates,
//!   whether through [`unsubscribe`](crate::SubscriptionHandle::unsubscribe)
//!   or a bus-wide shutdown. No `on_message` follows it.
//! - Errors are the implementation's own responsibility; the bus observes
//!   nothing a handler does except panics, which are caught and logged.
//!   A handler that fails downstream (e.g. a dead connection) is expected to
//!   unsubscribe itself via the provided handle.

use async_trait::async_trait;

use crate::bus::SubscriptionHandle;
use crate::message::Message;

/// Contract for bus consumers.
///
/// Called from a subscriber-dedicated worker task. Implementations should
/// avoid blocking the async runtime (prefer async I/O and cooperative waits).
#[async_trait]
pub trait Subscriber: Send + Sync + 'static {
    /// Handle one delivered message.
    ///
    /// # Parameters
    /// - `msg`: the matching message (shared; copy before mutating)
    /// - `handle`: this subscription's own handle, so the implementation can
    ///   unsubscribe itself (e.g. on a downstream write failure)
    async fn on_message(&self, msg: &Message, handle: &SubscriptionHandle);

    /// Called exactly once when the subscription terminates.
    async fn on_shutdown(&self) {}

    /// Human-readable name (for logs).
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

//! # Notification bus: one contract, two delivery strategies.
//!
//! [`Bus`] is the abstract publish/subscribe contract. Both strategies
//! implement it, so a host picks one behind `Arc<dyn Bus>` and the rest of
//! its wiring stays identical:
//!
//! ```text
//!                    ┌────────────────────────────────────────────┐
//! producer ────────► │ Bus::publish(Message { topic, body })      │
//!                    └───────┬────────────────────────────────────┘
//!                            ▼  topic_matches(topic, pattern)
//!          ┌─────────────────┴──────────────────┐
//!          ▼ FanoutBus                          ▼ RingBus
//!   per-subscriber unbounded queue       shared fixed-size ring
//!   (lossless, independent pace)         (lossy, skips when lapped)
//!          │                                    │
//!          ▼ worker task per subscriber         ▼ worker task per subscriber
//!   Subscriber::on_message(msg, handle)  Subscriber::on_message(msg, handle)
//! ```
//!
//! ## Choosing a strategy
//! - [`FanoutBus`]: every active subscriber sees every matching message,
//!   FIFO, regardless of how slow other subscribers are. Queues are
//!   unbounded, so a subscriber that never drains grows its queue.
//! - [`RingBus`]: fixed memory; a subscriber that cannot keep pace silently
//!   skips overwritten messages.
//!
//! ## Lifecycle
//! Per subscriber, both strategies:
//! `Created → Active → (Unsubscribed | ShutdownObserved) → Terminated`.
//! `on_shutdown` fires exactly once on termination, and no `on_message`
//! follows it. A bus that has shut down never reactivates; publishing to it
//! is a silent no-op, and subscribing to it succeeds structurally but the
//! subscriber terminates immediately.

mod fanout;
mod handle;
mod ring;

use std::sync::Arc;

use async_trait::async_trait;

use crate::message::Message;
use crate::subscribers::Subscriber;

pub use fanout::FanoutBus;
pub use handle::SubscriptionHandle;
pub use ring::{RingBus, DEFAULT_RING_CAPACITY};

/// Abstract publish/subscribe contract implemented by both strategies.
///
/// All operations are infallible: publishing with zero matching subscribers
/// is a no-op, registration never fails, and handler errors never reach the
/// publisher.
#[async_trait]
pub trait Bus: Send + Sync {
    /// Registers a subscriber under `pattern` and starts its worker task.
    ///
    /// Returns immediately; the registration is visible to every subsequent
    /// [`publish`](Bus::publish). The returned handle unsubscribes (idempotently)
    /// and is also passed back into each `on_message` call so handlers can
    /// unsubscribe themselves.
    async fn subscribe(&self, pattern: &str, subscriber: Arc<dyn Subscriber>)
        -> SubscriptionHandle;

    /// Publishes a message to every active subscriber whose pattern matches
    /// `msg.topic`.
    ///
    /// Never blocks waiting for a subscriber to consume; may block briefly
    /// on the bus's internal lock.
    async fn publish(&self, msg: Message);

    /// Shuts the bus down: every subscriber observes termination and its
    /// `on_shutdown` fires exactly once.
    ///
    /// Subsequent publishes are silent no-ops. Must not be called twice
    /// concurrently.
    async fn shutdown(&self);
}

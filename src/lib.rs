//! # topicbus
//!
//! **topicbus** is a single-process, in-memory, topic-based publish/subscribe
//! notification bus, built to push "document changed" events to live
//! subscribers (e.g. over a long-lived connection held by the host).
//!
//! Independent producers publish [`Message`]s to topics; independent, slow,
//! or fast consumers subscribe with wildcard [patterns](topic_matches) and
//! are each driven by a dedicated async task, so a stalled consumer never
//! blocks a producer or its peers.
//!
//! ## Architecture
//! ```text
//! producer ──► Bus::publish(topic, body)
//!                  │
//!                  ▼ topic_matches(topic, pattern)
//!        ┌─────────┴──────────┐
//!        ▼                    ▼
//!   FanoutBus             RingBus
//!   per-subscriber        shared fixed-size ring,
//!   unbounded queues      per-subscriber cursors
//!   (lossless FIFO)       (lossy when lapped)
//!        │                    │
//!        ▼                    ▼
//!   worker task per subscriber
//!        │
//!        ▼
//!   Subscriber::on_message(msg, handle) ──► host sink (socket write, ...)
//! ```
//!
//! The bus is storage- and transport-agnostic: a typical host wires "value
//! written to storage" to `publish(topic = "<type>.<id>", body = encoded)`,
//! and wires a per-connection live-update endpoint to `subscribe` with a
//! sink that writes each message to the transport and unsubscribes itself
//! when the write fails.
//!
//! ## Features
//! | Area           | Description                                           | Key types                      |
//! |----------------|-------------------------------------------------------|--------------------------------|
//! | **Matching**   | Single-wildcard topic patterns, fail-closed.          | [`topic_matches`], [`Pattern`] |
//! | **Bus**        | One contract, two interchangeable strategies.         | [`Bus`], [`FanoutBus`], [`RingBus`] |
//! | **Consumers**  | Capability interface driven by per-subscriber tasks.  | [`Subscriber`], [`SubscriberFn`] |
//! | **Lifecycle**  | Idempotent unsubscribe, bus-wide shutdown.            | [`SubscriptionHandle`]         |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogWriter`] _(demo/reference only)_.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use std::time::Duration;
//! use topicbus::{Bus, FanoutBus, Message, SubscriberFn, SubscriptionHandle};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let bus = FanoutBus::new();
//!
//!     // A subscriber on a wildcard pattern; real hosts implement
//!     // `Subscriber` directly to await transport writes.
//!     let printer = SubscriberFn::arc("printer", |msg: &Message, _h: &SubscriptionHandle| {
//!         println!("{} changed ({} bytes)", msg.topic, msg.body.len());
//!     });
//!     let handle = bus.subscribe("note.*", printer).await;
//!
//!     bus.publish(Message::new("note.42", b"{\"id\":42}".as_slice())).await;
//!     bus.publish(Message::new("thing.1", b"ignored".as_slice())).await;
//!
//!     tokio::time::sleep(Duration::from_millis(10)).await;
//!     handle.unsubscribe();
//!     bus.shutdown().await;
//! }
//! ```

mod bus;
mod error;
mod message;
mod pattern;
mod subscribers;

// ---- Public re-exports ----

pub use bus::{Bus, FanoutBus, RingBus, SubscriptionHandle, DEFAULT_RING_CAPACITY};
pub use error::PatternError;
pub use message::Message;
pub use pattern::{topic_matches, Pattern, WILDCARD};
pub use subscribers::{Subscriber, SubscriberFn};

// Optional: expose a simple built-in logger subscriber (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;

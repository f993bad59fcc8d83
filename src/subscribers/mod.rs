//! # Delivery capability for bus consumers.
//!
//! A consumer plugs into the bus by implementing [`Subscriber`]: a pair of
//! callbacks invoked from the consumer's dedicated worker task.
//!
//! ```text
//! Publish(msg) ──► bus ──► matching subscriber's task ──► on_message(msg, handle)
//! Shutdown()   ──► bus ──► every subscriber's task     ──► on_shutdown()  (once)
//! ```
//!
//! ## Contents
//! - [`Subscriber`] — the capability interface (`on_message`/`on_shutdown`).
//! - [`SubscriberFn`] — closure-backed implementation for tests and simple hosts.
//! - [`LogWriter`] — stdout printer behind the `logging` feature (demo only).
//!
//! A typical production implementation is a notification sink that writes
//! each message to a transport and calls
//! [`SubscriptionHandle::unsubscribe`](crate::SubscriptionHandle::unsubscribe)
//! on itself when the write fails.

mod subscriber;
mod subscriber_fn;

#[cfg(feature = "logging")]
mod log;

pub use subscriber::Subscriber;
pub use subscriber_fn::SubscriberFn;

#[cfg(feature = "logging")]
pub use log::LogWriter;

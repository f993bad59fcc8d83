//! # Ring-buffer bus: lossy, fixed-capacity delivery.
//!
//! [`RingBus`] keeps one circular buffer of the most recent messages,
//! shared by all subscribers. Each subscriber tracks its own read cursor
//! and is woken through a shared [`Notify`] whenever the write cursor
//! advances.
//!
//! ## Diagram
//! ```text
//!   publish(msg)                       shared state (Mutex)
//!       │  lock, advance cursor   ┌──────────────────────────────┐
//!       ├─────────────────────────│ buffer[N]  writeCursor       │
//!       │  notify_waiters()       └──────────────────────────────┘
//!       │                               ▲ read one slot, own cursor
//!       │                          ┌────┴────┬─────────┐
//!       └──────── wake ──────────► worker S1  worker S2 ...
//! ```
//!
//! ## Lossy by design
//! A subscriber that cannot keep pace with the publish rate is lapped: the
//! publisher overwrites slots its cursor has not reached, and those
//! messages are silently skipped. No error is raised for a skipped message.
//! The cursors are positions modulo the capacity, exactly like the shared
//! write cursor, so a lap of exactly one full buffer is indistinguishable
//! from "caught up" and cannot be counted.
//!
//! ## Known limitation
//! All workers and the publisher share one exclusive lock. Workers hold it
//! only while copying a single slot out (delivery happens after release),
//! but consumption still serializes with wake-up order; fine for moderate
//! subscriber counts, not for fan-out to thousands.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use async_trait::async_trait;
use futures::FutureExt;
use tokio::sync::{Mutex, Notify};
use tokio_util::sync::CancellationToken;

use crate::message::Message;
use crate::pattern::topic_matches;
use crate::subscribers::Subscriber;

use super::handle::SubscriptionHandle;
use super::Bus;

/// Default ring capacity (retained recent messages).
pub const DEFAULT_RING_CAPACITY: usize = 1024;

/// Shared buffer state. `active` is monotonic: once false, never true again.
struct RingState {
    active: bool,
    cursor: u64,
    buffer: Vec<Option<Message>>,
}

struct RingInner {
    state: Mutex<RingState>,
    notify: Arc<Notify>,
    capacity: u64,
}

fn step(cursor: u64, len: u64) -> u64 {
    (cursor + 1) % len
}

/// Lossy bus over a fixed-size shared ring buffer.
///
/// Subscribers only see messages published after they subscribe (the read
/// cursor starts at the current write cursor; no backlog replay), and may
/// skip messages when lapped — see the module docs.
///
/// ## Example
/// ```rust
/// use std::sync::Arc;
/// use topicbus::{Bus, Message, RingBus, SubscriberFn, SubscriptionHandle};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let bus = RingBus::new(128);
/// let sub = SubscriberFn::arc("tail", |msg: &Message, _h: &SubscriptionHandle| {
///     let _ = &msg.body;
/// });
/// let handle = bus.subscribe("*", sub).await;
/// bus.publish(Message::new("note.1", b"hi".as_slice())).await;
/// handle.unsubscribe();
/// bus.shutdown().await;
/// # }
/// ```
#[derive(Clone)]
pub struct RingBus {
    inner: Arc<RingInner>,
}

impl RingBus {
    /// Creates a bus retaining the `capacity` most recent messages.
    ///
    /// The minimum capacity is 2 (clamped): cursor equality is the "caught
    /// up" test, so a single-slot ring could never present a readable slot.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(2);
        Self {
            inner: Arc::new(RingInner {
                state: Mutex::new(RingState {
                    active: true,
                    cursor: 0,
                    buffer: vec![None; capacity],
                }),
                notify: Arc::new(Notify::new()),
                capacity: capacity as u64,
            }),
        }
    }

    /// Capacity the bus was constructed with.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.inner.capacity as usize
    }
}

impl Default for RingBus {
    /// A bus with [`DEFAULT_RING_CAPACITY`] slots.
    fn default() -> Self {
        Self::new(DEFAULT_RING_CAPACITY)
    }
}

#[async_trait]
impl Bus for RingBus {
    async fn subscribe(
        &self,
        pattern: &str,
        subscriber: Arc<dyn Subscriber>,
    ) -> SubscriptionHandle {
        let token = CancellationToken::new();
        let handle = SubscriptionHandle::ring(token, Arc::clone(&self.inner.notify));
        // Start at the current write cursor: no backlog replay.
        let cursor = self.inner.state.lock().await.cursor;
        tokio::spawn(read_loop(
            Arc::clone(&self.inner),
            Arc::from(pattern),
            subscriber,
            handle.clone(),
            cursor,
        ));
        handle
    }

    async fn publish(&self, msg: Message) {
        {
            let mut state = self.inner.state.lock().await;
            if !state.active {
                return;
            }
            state.cursor = step(state.cursor, self.inner.capacity);
            let slot = state.cursor as usize;
            state.buffer[slot] = Some(msg);
        }
        self.inner.notify.notify_waiters();
    }

    async fn shutdown(&self) {
        {
            let mut state = self.inner.state.lock().await;
            state.active = false;
        }
        self.inner.notify.notify_waiters();
    }
}

/// Per-subscriber worker: wait for the write cursor to pass ours, then
/// consume one slot at a time. Termination checks are level-triggered, so a
/// flag flip plus a wake is enough to stop the loop.
async fn read_loop(
    inner: Arc<RingInner>,
    pattern: Arc<str>,
    subscriber: Arc<dyn Subscriber>,
    handle: SubscriptionHandle,
    mut cursor: u64,
) {
    loop {
        let mut state = inner.state.lock().await;

        // Caught up: wait for a publish, re-checking liveness on each wake.
        while state.cursor == cursor {
            if !state.active || !handle.is_active() {
                drop(state);
                subscriber.on_shutdown().await;
                return;
            }
            // Register the waiter before releasing the lock, otherwise a
            // publish between unlock and await would be missed.
            let notified = inner.notify.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();
            drop(state);
            notified.await;
            state = inner.state.lock().await;
        }

        if !state.active || !handle.is_active() {
            drop(state);
            subscriber.on_shutdown().await;
            return;
        }

        // Copy the next slot out under the lock; deliver after releasing it
        // so the publisher never waits on a handler.
        cursor = step(cursor, inner.capacity);
        let slot = state.buffer[cursor as usize].clone();
        drop(state);

        if let Some(msg) = slot {
            if topic_matches(&msg.topic, &pattern) {
                let fut = subscriber.on_message(&msg, &handle);
                if let Err(panic_err) = AssertUnwindSafe(fut).catch_unwind().await {
                    eprintln!(
                        "[topicbus] subscriber '{}' panicked: {:?}",
                        subscriber.name(),
                        panic_err
                    );
                }
            }
        }
    }
}

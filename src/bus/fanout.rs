//! # Fan-out bus: lossless per-subscriber queues.
//!
//! [`FanoutBus`] keeps a registration table from pattern to subscriber set.
//! Publishing matches the topic against every registered pattern and hands a
//! clone of the message to each matching subscriber's private unbounded
//! queue; a dedicated worker task drains each queue FIFO.
//!
//! ## Diagram
//! ```text
//!    publish(msg)                 registration table (RwLock)
//!        │        read lock   ┌───────────────────────────────┐
//!        ├────────────────────│ "note.*"  → { S1, S2 }        │
//!        │   topic_matches()  │ "thing.1" → { S3 }            │
//!        │                    └───────────────────────────────┘
//!        ├──► [queue S1] ─► worker S1 ─► on_message()
//!        └──► [queue S2] ─► worker S2 ─► on_message()
//! ```
//!
//! ## Properties
//! - **Non-blocking publish**: enqueues never block (unbounded queues); one
//!   slow consumer only grows its own queue, it cannot delay other
//!   subscribers or the publisher.
//! - **Per-subscriber FIFO**: each subscriber observes its matching messages
//!   in global publish order (publishes are linearized by the table lock).
//! - **No cross-subscriber ordering**: workers run independently.
//! - **Drain on shutdown**: `shutdown()` closes every queue; workers deliver
//!   what was already enqueued, then fire `on_shutdown` and exit.
//! - **Panic isolation**: handler panics are caught in the worker and logged
//!   to stderr; they never reach the publisher.

use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use futures::FutureExt;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::message::Message;
use crate::pattern::topic_matches;
use crate::subscribers::Subscriber;

use super::handle::SubscriptionHandle;
use super::Bus;

struct Entry {
    tx: mpsc::UnboundedSender<Message>,
    token: CancellationToken,
}

/// Registration table. `active` is monotonic: once false, never true again.
struct Registry {
    active: bool,
    next_id: u64,
    entries: HashMap<Arc<str>, HashMap<u64, Entry>>,
}

pub(crate) struct FanoutInner {
    registry: RwLock<Registry>,
}

impl FanoutInner {
    fn read(&self) -> std::sync::RwLockReadGuard<'_, Registry> {
        self.registry.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Registry> {
        self.registry
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Removes one subscriber entry, dropping its sender (closes the queue).
    pub(crate) fn remove(&self, pattern: &str, id: u64) {
        let mut reg = self.write();
        if let Some(subs) = reg.entries.get_mut(pattern) {
            subs.remove(&id);
            if subs.is_empty() {
                reg.entries.remove(pattern);
            }
        }
    }
}

/// Lossless fan-out bus with one unbounded queue and worker task per
/// subscriber.
///
/// Construct at host startup, share (`Clone` or `Arc<dyn Bus>`), call
/// [`shutdown`](Bus::shutdown) at teardown. No implicit singletons.
///
/// ## Example
/// ```rust
/// use std::sync::Arc;
/// use topicbus::{Bus, FanoutBus, Message, SubscriberFn, SubscriptionHandle};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let bus = FanoutBus::new();
/// let sub = SubscriberFn::arc("noter", |msg: &Message, _h: &SubscriptionHandle| {
///     assert!(msg.topic.starts_with("note."));
/// });
/// let handle = bus.subscribe("note.*", sub).await;
/// bus.publish(Message::new("note.1", b"hi".as_slice())).await;
/// handle.unsubscribe();
/// bus.shutdown().await;
/// # }
/// ```
#[derive(Clone)]
pub struct FanoutBus {
    inner: Arc<FanoutInner>,
}

impl FanoutBus {
    /// Creates an empty, active bus.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(FanoutInner {
                registry: RwLock::new(Registry {
                    active: true,
                    next_id: 0,
                    entries: HashMap::new(),
                }),
            }),
        }
    }

    /// Number of currently registered subscribers (diagnostics).
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner.read().entries.values().map(HashMap::len).sum()
    }
}

impl Default for FanoutBus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Bus for FanoutBus {
    async fn subscribe(
        &self,
        pattern: &str,
        subscriber: Arc<dyn Subscriber>,
    ) -> SubscriptionHandle {
        let pattern: Arc<str> = Arc::from(pattern);
        let token = CancellationToken::new();
        let (tx, rx) = mpsc::unbounded_channel::<Message>();

        let id;
        {
            let mut reg = self.inner.write();
            id = reg.next_id;
            reg.next_id += 1;
            if reg.active {
                reg.entries.entry(Arc::clone(&pattern)).or_default().insert(
                    id,
                    Entry {
                        tx,
                        token: token.clone(),
                    },
                );
            }
            // After shutdown the sender is simply dropped: the subscription
            // still succeeds structurally, but its worker finds a closed
            // queue and terminates straight away.
        }

        let handle =
            SubscriptionHandle::fanout(token, Arc::downgrade(&self.inner), pattern, id);
        tokio::spawn(deliver_loop(subscriber, rx, handle.clone()));
        handle
    }

    async fn publish(&self, msg: Message) {
        let reg = self.inner.read();
        if !reg.active {
            return;
        }
        for (pattern, subs) in &reg.entries {
            if !topic_matches(&msg.topic, pattern) {
                continue;
            }
            for entry in subs.values() {
                if entry.token.is_cancelled() {
                    continue;
                }
                // Unbounded send: only fails when the worker is gone, in
                // which case the message is dropped for that subscriber.
                let _ = entry.tx.send(msg.clone());
            }
        }
    }

    async fn shutdown(&self) {
        let mut reg = self.inner.write();
        reg.active = false;
        // Dropping every sender closes the queues; each worker drains what
        // was already enqueued, fires on_shutdown, and exits.
        reg.entries.clear();
    }
}

/// Per-subscriber worker: drain the queue FIFO, then terminate.
async fn deliver_loop(
    subscriber: Arc<dyn Subscriber>,
    mut rx: mpsc::UnboundedReceiver<Message>,
    handle: SubscriptionHandle,
) {
    while let Some(msg) = rx.recv().await {
        if !handle.is_active() {
            break;
        }
        let fut = subscriber.on_message(&msg, &handle);
        if let Err(panic_err) = AssertUnwindSafe(fut).catch_unwind().await {
            eprintln!(
                "[topicbus] subscriber '{}' panicked: {:?}",
                subscriber.name(),
                panic_err
            );
        }
    }
    subscriber.on_shutdown().await;
}

//! # Subscription handle.
//!
//! [`SubscriptionHandle`] is the consumer-facing side of a registration: a
//! liveness token plus the strategy-specific teardown needed to stop
//! delivery. The bus returns one from `subscribe` and passes a clone of it
//! into every `on_message` call, so a handler can unsubscribe itself.

use std::fmt;
use std::sync::{Arc, Weak};

use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;

use super::fanout::FanoutInner;

/// Handle to one live subscription.
///
/// Cloneable; all clones refer to the same subscription. Liveness is a
/// [`CancellationToken`]: once cancelled it stays cancelled, which is what
/// makes [`unsubscribe`](SubscriptionHandle::unsubscribe) idempotent and
/// safe to race with in-flight delivery (the worker checks the token before
/// each delivery, so at most one message already in flight at the moment of
/// the call can still arrive).
#[derive(Clone)]
pub struct SubscriptionHandle {
    token: CancellationToken,
    kind: HandleKind,
}

#[derive(Clone)]
enum HandleKind {
    /// Fan-out teardown: drop the registry entry, which closes the queue.
    Fanout {
        registry: Weak<FanoutInner>,
        pattern: Arc<str>,
        id: u64,
    },
    /// Ring teardown: wake the waiters; the worker's liveness checks are
    /// level-triggered, so no bus lock is needed.
    Ring { notify: Arc<Notify> },
}

impl SubscriptionHandle {
    pub(crate) fn fanout(
        token: CancellationToken,
        registry: Weak<FanoutInner>,
        pattern: Arc<str>,
        id: u64,
    ) -> Self {
        Self {
            token,
            kind: HandleKind::Fanout {
                registry,
                pattern,
                id,
            },
        }
    }

    pub(crate) fn ring(token: CancellationToken, notify: Arc<Notify>) -> Self {
        Self {
            token,
            kind: HandleKind::Ring { notify },
        }
    }

    /// True until [`unsubscribe`](SubscriptionHandle::unsubscribe) is called.
    ///
    /// A bus-wide shutdown does not flip this; it terminates the worker
    /// directly (buffered fan-out messages still drain).
    pub fn is_active(&self) -> bool {
        !self.token.is_cancelled()
    }

    /// Stops delivery to this subscriber.
    ///
    /// Idempotent: the second and later calls are no-ops. Safe to call from
    /// within the subscriber's own `on_message`. After this returns, no
    /// further `on_message` fires beyond one message that may already be in
    /// flight; the worker then fires `on_shutdown` and exits.
    pub fn unsubscribe(&self) {
        if self.token.is_cancelled() {
            return;
        }
        self.token.cancel();
        match &self.kind {
            HandleKind::Fanout {
                registry,
                pattern,
                id,
            } => {
                // Dropping the entry closes the queue and wakes the worker.
                if let Some(inner) = registry.upgrade() {
                    inner.remove(pattern, *id);
                }
            }
            HandleKind::Ring { notify } => notify.notify_waiters(),
        }
    }
}

impl fmt::Debug for SubscriptionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let strategy = match self.kind {
            HandleKind::Fanout { .. } => "fanout",
            HandleKind::Ring { .. } => "ring",
        };
        f.debug_struct("SubscriptionHandle")
            .field("strategy", &strategy)
            .field("active", &self.is_active())
            .finish()
    }
}

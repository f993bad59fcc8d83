//! # Demo: ring_tail
//!
//! A [`RingBus`] tailing recent events with a slow consumer: the publisher
//! keeps a fixed memory footprint and never waits, the consumer silently
//! skips whatever it was lapped on.
//!
//! ## Run
//! ```bash
//! cargo run --example ring_tail
//! ```

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use topicbus::{Bus, Message, RingBus, Subscriber, SubscriptionHandle};

struct SlowTail {
    seen: Arc<AtomicUsize>,
}

#[async_trait]
impl Subscriber for SlowTail {
    async fn on_message(&self, msg: &Message, _handle: &SubscriptionHandle) {
        // Pretend each message takes a while to process.
        tokio::time::sleep(Duration::from_millis(5)).await;
        self.seen.fetch_add(1, Ordering::SeqCst);
        println!("tail saw {}", msg.topic);
    }

    async fn on_shutdown(&self) {
        println!("tail done, saw {} of the published messages", self.seen.load(Ordering::SeqCst));
    }

    fn name(&self) -> &str {
        "slow-tail"
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let bus = RingBus::new(8);
    let seen = Arc::new(AtomicUsize::new(0));
    bus.subscribe("note.*", Arc::new(SlowTail { seen: Arc::clone(&seen) }))
        .await;

    for i in 0..100 {
        bus.publish(Message::new(format!("note.{i}"), b"changed".as_slice()))
            .await;
    }

    tokio::time::sleep(Duration::from_millis(200)).await;
    bus.shutdown().await;
    tokio::time::sleep(Duration::from_millis(20)).await;
}

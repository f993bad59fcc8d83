//! # Demo: live_updates
//!
//! Shows the typical host wiring around a [`FanoutBus`]:
//! - "value written to storage" becomes `publish(topic = "<type>.<id>")`,
//! - a per-connection live-update endpoint becomes a [`Subscriber`] that
//!   writes each message to its transport and unsubscribes itself when the
//!   write fails (a dead connection tears its own subscription down).
//!
//! ## Flow
//! ```text
//! store.put("note", 42, body)
//!     └─► bus.publish("note.42", body)
//!             └─► NotificationSink::on_message
//!                     ├─ write ok  ─► keep streaming
//!                     └─ write err ─► handle.unsubscribe() + close
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example live_updates
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use topicbus::{Bus, FanoutBus, Message, Subscriber, SubscriptionHandle};

/// Stand-in for a long-lived connection (e.g. a websocket).
struct MockTransport {
    name: &'static str,
    broken: AtomicBool,
}

impl MockTransport {
    fn write(&self, msg: &Message) -> Result<(), &'static str> {
        if self.broken.load(Ordering::SeqCst) {
            return Err("connection reset");
        }
        println!(
            "[{}] -> {} ({} bytes)",
            self.name,
            msg.topic,
            msg.body.len()
        );
        Ok(())
    }

    fn close(&self) {
        println!("[{}] closed", self.name);
    }
}

/// Forwards bus messages to one transport; on a write failure it
/// unsubscribes and tears its connection down.
struct NotificationSink {
    transport: Arc<MockTransport>,
}

#[async_trait]
impl Subscriber for NotificationSink {
    async fn on_message(&self, msg: &Message, handle: &SubscriptionHandle) {
        if let Err(err) = self.transport.write(msg) {
            eprintln!("[{}] write failed: {err}; unsubscribing", self.transport.name);
            handle.unsubscribe();
            self.transport.close();
        }
    }

    async fn on_shutdown(&self) {
        self.transport.close();
    }

    fn name(&self) -> &str {
        self.transport.name
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let bus = FanoutBus::new();

    // One connection watching a single document, one watching all notes.
    let single = Arc::new(MockTransport {
        name: "conn-note-42",
        broken: AtomicBool::new(false),
    });
    bus.subscribe(
        "note.42",
        Arc::new(NotificationSink {
            transport: Arc::clone(&single),
        }),
    )
    .await;

    let all_notes = Arc::new(MockTransport {
        name: "conn-notes",
        broken: AtomicBool::new(false),
    });
    bus.subscribe(
        "note.*",
        Arc::new(NotificationSink {
            transport: Arc::clone(&all_notes),
        }),
    )
    .await;

    // The host's storage layer reports writes.
    bus.publish(Message::new("note.42", br#"{"text":"hello"}"#.as_slice()))
        .await;
    bus.publish(Message::new("note.7", br#"{"text":"other"}"#.as_slice()))
        .await;
    bus.publish(Message::new("thing.1", b"not a note".as_slice()))
        .await;

    tokio::time::sleep(Duration::from_millis(20)).await;

    // The single-document connection dies; its next delivery unsubscribes it.
    single.broken.store(true, Ordering::SeqCst);
    bus.publish(Message::new("note.42", br#"{"text":"bye"}"#.as_slice()))
        .await;

    tokio::time::sleep(Duration::from_millis(20)).await;
    bus.shutdown().await;
    tokio::time::sleep(Duration::from_millis(20)).await;
}

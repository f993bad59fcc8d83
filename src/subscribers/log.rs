//! # Simple logging subscriber for debugging and demos.
//!
//! [`LogWriter`] prints delivered messages to stdout in a human-readable
//! format. Primarily useful for development and the bundled demos.
//!
//! ## Output format
//! ```text
//! [deliver] topic=note.42 bytes=17
//! [shutdown]
//! ```

use async_trait::async_trait;

use crate::bus::SubscriptionHandle;
use crate::message::Message;

use super::Subscriber;

/// Simple stdout logging subscriber.
///
/// Enabled via the `logging` feature. Not intended for production use —
/// implement a custom [`Subscriber`] for structured logging.
pub struct LogWriter;

#[async_trait]
impl Subscriber for LogWriter {
    async fn on_message(&self, msg: &Message, _handle: &SubscriptionHandle) {
        println!("[deliver] topic={} bytes={}", msg.topic, msg.body.len());
    }

    async fn on_shutdown(&self) {
        println!("[shutdown]");
    }

    fn name(&self) -> &str {
        "log-writer"
    }
}

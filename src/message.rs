//! # Published messages.
//!
//! A [`Message`] pairs a concrete topic (e.g. `"note.42"`) with an opaque
//! payload. Messages are immutable once published and cheap to clone: the
//! bus hands the same shared topic/body to every matching subscriber, so a
//! consumer that needs to mutate the payload copies it first.

use std::sync::Arc;

/// An immutable topic + payload pair.
///
/// Created by the publisher, read-only thereafter. Cloning shares the
/// underlying allocations (`Arc` fields), which is what makes fan-out to
/// many subscribers allocation-free per delivery.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Message {
    /// Concrete topic identifying the event's subject (e.g. `"note.42"`).
    pub topic: Arc<str>,
    /// Opaque payload, typically the encoded document value.
    pub body: Arc<[u8]>,
}

impl Message {
    /// Creates a new message.
    ///
    /// # Example
    /// ```
    /// use topicbus::Message;
    ///
    /// let msg = Message::new("note.42", b"{\"id\":42}".as_slice());
    /// assert_eq!(&*msg.topic, "note.42");
    /// ```
    pub fn new(topic: impl Into<Arc<str>>, body: impl Into<Arc<[u8]>>) -> Self {
        Self {
            topic: topic.into(),
            body: body.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clone_shares_allocations() {
        let msg = Message::new("note.1", vec![1u8, 2, 3]);
        let copy = msg.clone();
        assert!(Arc::ptr_eq(&msg.topic, &copy.topic));
        assert!(Arc::ptr_eq(&msg.body, &copy.body));
        assert_eq!(msg, copy);
    }
}

//! Message model for pull-based consumption.

use std::collections::HashMap;

/// Per-delivery acknowledgment handle.
///
/// Identifies one delivery of a message, not the message itself: a
/// redelivered message carries a fresh ack ID. Acknowledging per
/// delivery is what makes partial-failure isolation possible.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AckId(pub String);

impl std::fmt::Display for AckId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// An opaque payload pulled from a subscription.
///
/// Ownership transfers to the consumer on pull; the queue retains the
/// message for redelivery until its ack ID is acknowledged
/// (at-least-once delivery).
#[derive(Debug, Clone)]
pub struct Message {
    pub ack_id: AckId,
    pub message_id: String,
    pub payload: Vec<u8>,
    pub attributes: HashMap<String, String>,
    /// Publish time in Unix milliseconds.
    pub publish_time: i64,
}

impl Message {
    /// Payload interpreted as UTF-8, lossily.
    pub fn payload_str(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.payload)
    }
}

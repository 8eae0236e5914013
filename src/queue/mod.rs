//! Message model and the pull/ack consumption loop.

pub mod backoff;
pub mod consumer;
pub mod message;

pub use backoff::Backoff;
pub use consumer::{Consumer, MessageHandler};
pub use message::{AckId, Message};

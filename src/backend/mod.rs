//! Backend trait seams for the external collaborators.
//!
//! The monitoring and queue services are opaque: protocol detail lives
//! behind these traits. [`memory`] provides full in-memory
//! implementations for the demo binaries and the test suite.

pub mod memory;

use async_trait::async_trait;

use crate::error::BackendError;
use crate::metric::descriptor::MetricDescriptor;
use crate::metric::sample::Sample;
use crate::queue::message::{AckId, Message};

/// Monitoring service accepting descriptor registration and time-series
/// point submission, keyed by a project identifier.
#[async_trait]
pub trait MonitoringBackend: Send + Sync {
    /// Declare a metric descriptor under `project`.
    ///
    /// Registration is idempotent for an identical descriptor;
    /// redefining the kind or value type of an existing descriptor is a
    /// permanent error. Returns the server-assigned descriptor name.
    async fn create_descriptor(
        &self,
        project: &str,
        descriptor: &MetricDescriptor,
    ) -> Result<String, BackendError>;

    /// Record one sample for `metric_type` under `project`.
    async fn create_time_series(
        &self,
        project: &str,
        metric_type: &str,
        sample: Sample,
    ) -> Result<(), BackendError>;
}

/// Queue service supporting bounded pulls and per-message acknowledgment.
#[async_trait]
pub trait QueueBackend: Send + Sync {
    /// Return up to `max_messages` undelivered messages.
    ///
    /// An empty batch is not an error; it means the subscription has no
    /// backlog right now.
    async fn pull(
        &self,
        subscription: &str,
        max_messages: usize,
    ) -> Result<Vec<Message>, BackendError>;

    /// Finalize removal of the given deliveries from the queue.
    ///
    /// Deliveries not acknowledged before their deadline are redelivered
    /// with fresh ack IDs.
    async fn acknowledge(&self, subscription: &str, ack_ids: &[AckId])
        -> Result<(), BackendError>;
}

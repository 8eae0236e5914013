//! In-memory backend implementations.
//!
//! Used by the demo binaries and the test suite. Behavioral contracts
//! mirror the managed services: idempotent descriptor registration with
//! conflict rejection, and at-least-once delivery with per-delivery
//! ack IDs.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::backend::{MonitoringBackend, QueueBackend};
use crate::error::BackendError;
use crate::metric::descriptor::MetricDescriptor;
use crate::metric::sample::Sample;
use crate::queue::message::{AckId, Message};
use crate::{generate_id, now_millis};

/// In-memory monitoring backend recording descriptors and points.
#[derive(Debug, Default)]
pub struct InMemoryMonitoring {
    inner: Mutex<MonitoringState>,
}

#[derive(Debug, Default)]
struct MonitoringState {
    /// Registered descriptors keyed by metric type.
    descriptors: HashMap<String, MetricDescriptor>,
    /// Recorded points as (metric_type, sample), in submission order.
    points: Vec<(String, Sample)>,
}

impl InMemoryMonitoring {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registered descriptor for `metric_type`, if any.
    pub fn descriptor(&self, metric_type: &str) -> Option<MetricDescriptor> {
        self.inner.lock().unwrap().descriptors.get(metric_type).cloned()
    }

    /// All recorded points for `metric_type`, in submission order.
    pub fn points_for(&self, metric_type: &str) -> Vec<Sample> {
        self.inner
            .lock()
            .unwrap()
            .points
            .iter()
            .filter(|(t, _)| t == metric_type)
            .map(|(_, sample)| sample.clone())
            .collect()
    }

    /// Total number of recorded points across all series.
    pub fn point_count(&self) -> usize {
        self.inner.lock().unwrap().points.len()
    }
}

#[async_trait]
impl MonitoringBackend for InMemoryMonitoring {
    async fn create_descriptor(
        &self,
        project: &str,
        descriptor: &MetricDescriptor,
    ) -> Result<String, BackendError> {
        descriptor
            .validate()
            .map_err(|e| BackendError::Permanent(e.to_string()))?;

        let mut state = self.inner.lock().unwrap();
        if let Some(existing) = state.descriptors.get(&descriptor.metric_type) {
            if existing.kind != descriptor.kind || existing.value_type != descriptor.value_type {
                return Err(BackendError::Permanent(format!(
                    "descriptor '{}' already registered with a different kind or value type",
                    descriptor.metric_type
                )));
            }
            // Identical re-registration is idempotent.
        } else {
            state
                .descriptors
                .insert(descriptor.metric_type.clone(), descriptor.clone());
        }

        Ok(format!(
            "projects/{}/metricDescriptors/{}",
            project, descriptor.metric_type
        ))
    }

    async fn create_time_series(
        &self,
        _project: &str,
        metric_type: &str,
        sample: Sample,
    ) -> Result<(), BackendError> {
        if !sample.value.is_finite() {
            return Err(BackendError::Permanent(
                "sample value must be finite".into(),
            ));
        }

        let mut state = self.inner.lock().unwrap();
        if !state.descriptors.contains_key(metric_type) {
            return Err(BackendError::Permanent(format!(
                "unknown metric type '{metric_type}', register a descriptor first"
            )));
        }
        state.points.push((metric_type.to_string(), sample));
        Ok(())
    }
}

/// In-memory subscription queue with at-least-once delivery.
///
/// A pull moves messages from the backlog into an outstanding map keyed
/// by ack ID; acknowledging finalizes removal. Outstanding deliveries
/// can be pushed back to the backlog with fresh ack IDs, simulating an
/// expired ack deadline.
#[derive(Debug, Default)]
pub struct InMemoryQueue {
    inner: Mutex<QueueState>,
}

#[derive(Debug, Default)]
struct QueueState {
    pending: VecDeque<Message>,
    outstanding: HashMap<AckId, Message>,
    /// Message IDs finalized by acknowledgment, in ack order.
    acked: Vec<String>,
}

impl InMemoryQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish a message to the subscription backlog.
    ///
    /// Returns the assigned message ID.
    pub fn publish(&self, payload: Vec<u8>, attributes: HashMap<String, String>) -> String {
        let message_id = generate_id();
        let message = Message {
            ack_id: AckId(generate_id()),
            message_id: message_id.clone(),
            payload,
            attributes,
            publish_time: now_millis(),
        };
        self.inner.lock().unwrap().pending.push_back(message);
        message_id
    }

    /// Move every unacknowledged outstanding delivery back to the
    /// backlog with a fresh ack ID. Returns how many were redelivered.
    pub fn redeliver_unacked(&self) -> usize {
        let mut state = self.inner.lock().unwrap();
        let drained: Vec<Message> = state.outstanding.drain().map(|(_, m)| m).collect();
        let count = drained.len();
        for mut message in drained {
            message.ack_id = AckId(generate_id());
            state.pending.push_back(message);
        }
        count
    }

    /// Number of messages waiting to be pulled.
    pub fn pending_len(&self) -> usize {
        self.inner.lock().unwrap().pending.len()
    }

    /// Number of pulled-but-unacknowledged deliveries.
    pub fn outstanding_len(&self) -> usize {
        self.inner.lock().unwrap().outstanding.len()
    }

    /// Message IDs finalized by acknowledgment, in ack order.
    pub fn acked_ids(&self) -> Vec<String> {
        self.inner.lock().unwrap().acked.clone()
    }
}

#[async_trait]
impl QueueBackend for InMemoryQueue {
    async fn pull(
        &self,
        _subscription: &str,
        max_messages: usize,
    ) -> Result<Vec<Message>, BackendError> {
        let mut state = self.inner.lock().unwrap();
        let mut batch = Vec::new();
        while batch.len() < max_messages {
            match state.pending.pop_front() {
                Some(message) => batch.push(message),
                None => break,
            }
        }
        for message in &batch {
            state
                .outstanding
                .insert(message.ack_id.clone(), message.clone());
        }
        Ok(batch)
    }

    async fn acknowledge(
        &self,
        _subscription: &str,
        ack_ids: &[AckId],
    ) -> Result<(), BackendError> {
        let mut state = self.inner.lock().unwrap();
        for ack_id in ack_ids {
            if let Some(message) = state.outstanding.remove(ack_id) {
                state.acked.push(message.message_id);
            }
            // Unknown ack IDs are ignored, as a real queue does after an
            // expired deadline.
        }
        Ok(())
    }
}

//! Queue consumer loop: pull, process, acknowledge.
//!
//! Messages within a batch are processed with bounded concurrency under
//! a per-message timeout. Only messages whose handler succeeded are
//! acknowledged; failures stay outstanding so the queue redelivers them
//! (at-least-once delivery). An empty pull triggers idle backoff
//! instead of an immediate retry.

use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::backend::QueueBackend;
use crate::config::ConsumerConfig;
use crate::error::{BackendError, ProcessingError};
use crate::observability::metrics as obs;
use crate::queue::backoff::Backoff;
use crate::queue::message::{AckId, Message};

/// Consumer-defined work applied to each pulled message.
///
/// Processing must finish, successfully or by returning an error,
/// before its message becomes eligible for acknowledgment.
#[async_trait]
pub trait MessageHandler: Send + Sync {
    async fn process(&self, message: &Message) -> Result<(), ProcessingError>;
}

/// Pull-based consumer with per-message acknowledgment.
pub struct Consumer<B, H> {
    backend: Arc<B>,
    handler: H,
    config: ConsumerConfig,
}

impl<B, H> Consumer<B, H>
where
    B: QueueBackend,
    H: MessageHandler,
{
    pub fn new(backend: Arc<B>, handler: H, config: ConsumerConfig) -> Self {
        Self {
            backend,
            handler,
            config,
        }
    }

    /// Run one pull/process/ack cycle.
    ///
    /// Returns the number of messages pulled; zero means the queue was
    /// empty. Only successfully processed messages are acknowledged.
    pub async fn run_once(&self) -> Result<usize, BackendError> {
        let batch = self
            .backend
            .pull(&self.config.subscription, self.config.max_messages)
            .await?;

        if batch.is_empty() {
            return Ok(0);
        }

        let pulled = batch.len();
        obs::record_pulled(&self.config.subscription, pulled as u64);
        debug!(count = pulled, "pulled batch");

        let acked = self.process_batch(batch).await;
        if !acked.is_empty() {
            self.backend
                .acknowledge(&self.config.subscription, &acked)
                .await?;
            obs::record_acked(&self.config.subscription, acked.len() as u64);
        }

        Ok(pulled)
    }

    /// Process a batch with bounded concurrency and a per-message timeout.
    ///
    /// Returns the ack IDs of the messages that processed successfully.
    async fn process_batch(&self, batch: Vec<Message>) -> Vec<AckId> {
        let timeout = self.config.processing_timeout();

        let results: Vec<(Message, Result<(), ProcessingError>)> = stream::iter(batch)
            .map(|message| async move {
                let outcome = match tokio::time::timeout(timeout, self.handler.process(&message))
                    .await
                {
                    Ok(result) => result,
                    Err(_) => Err(ProcessingError::Timeout(timeout)),
                };
                (message, outcome)
            })
            .buffer_unordered(self.config.max_concurrency)
            .collect()
            .await;

        let mut acked = Vec::with_capacity(results.len());
        for (message, outcome) in results {
            match outcome {
                Ok(()) => {
                    debug!(message_id = %message.message_id, "message processed");
                    acked.push(message.ack_id);
                }
                Err(e) => {
                    obs::record_processing_failure(&self.config.subscription);
                    warn!(
                        message_id = %message.message_id,
                        error = %e,
                        "message processing failed, leaving unacked for redelivery"
                    );
                }
            }
        }
        acked
    }

    /// Run the consumption loop until shutdown is signaled.
    ///
    /// Empty pulls idle with capped exponential backoff; transient
    /// backend errors back off and retry. A permanent backend error
    /// ends the loop, it needs operator intervention.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) -> Result<(), BackendError> {
        info!(
            subscription = %self.config.subscription,
            max_messages = self.config.max_messages,
            max_concurrency = self.config.max_concurrency,
            "consumer started"
        );

        let mut idle = Backoff::new(
            self.config.idle_backoff_base(),
            self.config.idle_backoff_cap(),
        );
        let mut retry = Backoff::default();

        loop {
            if *shutdown.borrow() {
                break;
            }

            match self.run_once().await {
                Ok(0) => {
                    let delay = idle.next_delay();
                    debug!(delay_ms = delay.as_millis() as u64, "queue empty, idling");
                    if crate::sleep_or_shutdown(delay, &mut shutdown).await {
                        break;
                    }
                }
                Ok(count) => {
                    idle.reset();
                    retry.reset();
                    debug!(count, "batch complete");
                }
                Err(e) if e.is_transient() => {
                    let delay = retry.next_delay();
                    warn!(
                        error = %e,
                        delay_ms = delay.as_millis() as u64,
                        "transient backend error, backing off"
                    );
                    if crate::sleep_or_shutdown(delay, &mut shutdown).await {
                        break;
                    }
                }
                Err(e) => return Err(e),
            }
        }

        info!("consumer stopped");
        Ok(())
    }
}

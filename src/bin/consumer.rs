//! Pulse consumer: pulls message batches from a subscription and
//! processes each with a fixed-duration simulated workload.
//!
//! # Usage
//!
//! ```bash
//! pulse-consumer --max-messages 10 --max-concurrency 4
//! ```
//!
//! Environment variables can also be used:
//! - `PULSE_SUBSCRIPTION`: Subscription to pull from
//! - `PULSE_MAX_MESSAGES`: Maximum messages per pull
//! - `RUST_LOG`: Log level (trace, debug, info, warn, error)

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use pulsework::backend::memory::InMemoryQueue;
use pulsework::config::ConsumerConfig;
use pulsework::error::ProcessingError;
use pulsework::observability::metrics::init_metrics_with_endpoint;
use pulsework::observability::tracing::init_tracing;
use pulsework::queue::{Consumer, Message, MessageHandler};
use tokio::sync::watch;

/// Simulated workload: sleep for a fixed duration per message.
struct SleepHandler {
    duration: Duration,
}

#[async_trait]
impl MessageHandler for SleepHandler {
    async fn process(&self, message: &Message) -> Result<(), ProcessingError> {
        tracing::info!(message_id = %message.message_id, "processing");
        tokio::time::sleep(self.duration).await;
        tracing::info!(message_id = %message.message_id, "processed");
        Ok(())
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse configuration from CLI arguments and environment
    let config = ConsumerConfig::parse_args();

    // Initialize tracing/logging
    init_tracing(&config.log_level);

    // Initialize self-metrics (with optional OTLP export)
    init_metrics_with_endpoint(config.otel_endpoint.as_deref());

    // Fail fast on configuration the loop cannot run with
    config.validate()?;

    // The vendor service is out of scope; the demo consumes from an
    // in-memory queue fed by a synthetic producer so it runs
    // self-contained.
    let backend = Arc::new(InMemoryQueue::new());

    // Create shutdown signal channel and spawn the signal handler
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    pulsework::spawn_signal_handler(shutdown_tx);

    // Synthetic producer: one message every two seconds.
    let producer_backend = Arc::clone(&backend);
    let mut producer_shutdown = shutdown_rx.clone();
    tokio::spawn(async move {
        let mut n: u64 = 0;
        loop {
            tokio::select! {
                _ = tokio::time::sleep(Duration::from_secs(2)) => {
                    n += 1;
                    let message_id = producer_backend
                        .publish(format!("demo message {n}").into_bytes(), HashMap::new());
                    tracing::debug!(%message_id, "published");
                }
                _ = producer_shutdown.changed() => break,
            }
        }
    });

    let handler = SleepHandler {
        duration: Duration::from_secs(3),
    };
    let consumer = Consumer::new(backend, handler, config);
    consumer.run(shutdown_rx).await?;

    tracing::info!("pulse-consumer shutdown complete");
    Ok(())
}
